//! Translators for inventory windows.

use crate::{
    protocol::{
        bedrock::packets::{self as bedrock, Packet},
        java::play::{self, Slot},
    },
    session::{Session, Window},
    ProxyContext,
};

/// Bedrock container kinds.
mod container_kind {
    pub const CONTAINER: u8 = 0;
    pub const WORKBENCH: u8 = 1;
    pub const FURNACE: u8 = 2;
    pub const ENCHANTMENT: u8 = 3;
    pub const BREWING_STAND: u8 = 4;
    pub const ANVIL: u8 = 5;
    pub const HOPPER: u8 = 8;
    pub const BEACON: u8 = 13;
    pub const TRADING: u8 = 15;
}

/// Maps a Java window kind to a Bedrock container kind and the number
/// of container-local slots. Unknown kinds show as a plain chest.
fn map_window_kind(java_kind: i32) -> (u8, usize) {
    match java_kind {
        // generic_9x1 .. generic_9x6
        0..=5 => (container_kind::CONTAINER, 9 * (java_kind as usize + 1)),
        6 => (container_kind::CONTAINER, 9), // generic_3x3
        7 => (container_kind::ANVIL, 3),
        8 => (container_kind::BEACON, 1),
        9 => (container_kind::FURNACE, 3),  // blast furnace
        10 => (container_kind::BREWING_STAND, 5),
        11 => (container_kind::WORKBENCH, 10),
        13 => (container_kind::ENCHANTMENT, 2),
        14 => (container_kind::FURNACE, 3),
        16 => (container_kind::HOPPER, 5),
        20 => (container_kind::TRADING, 3),
        22 => (container_kind::FURNACE, 3), // smoker
        _ => (container_kind::CONTAINER, 27),
    }
}

/// Java slot indices of the player inventory window (id 0) to Bedrock
/// inventory slots. The hotbar sits at the end on the Java side and at
/// the front on the Bedrock side; crafting and armor slots live in
/// separate Bedrock windows and are not mirrored.
fn remap_player_slot(java_slot: i16) -> Option<u32> {
    match java_slot {
        9..=35 => Some(java_slot as u32),
        36..=44 => Some(java_slot as u32 - 36),
        _ => None,
    }
}

fn to_bedrock_item(ctx: &ProxyContext, slot: &Slot) -> bedrock::ItemStack {
    match &slot.item {
        Some(data) => {
            let mapped = ctx.mappings.items.to_bedrock(data.item_id);
            bedrock::ItemStack::new(mapped.id, data.count.max(0) as u8, mapped.damage)
        }
        None => bedrock::ItemStack::EMPTY,
    }
}

pub fn open_window(session: &mut Session, packet: play::OpenWindow) -> anyhow::Result<()> {
    let (kind, slot_count) = map_window_kind(packet.kind);
    let window_id = packet.window_id as u8;
    session.open_window(Window {
        id: window_id,
        kind,
        slot_count,
        contents: vec![bedrock::ItemStack::EMPTY; slot_count],
    });

    let player = session.player_position;
    session.send_bedrock(Packet::ContainerOpen(bedrock::ContainerOpen {
        window_id,
        kind,
        x: player.x.floor() as i32,
        y: player.y.max(0.0) as u32,
        z: player.z.floor() as i32,
        entity_unique_id: -1,
    }));
    Ok(())
}

pub fn window_items(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::WindowItems,
) -> anyhow::Result<()> {
    if packet.window_id == 0 {
        // Player inventory: reorder into the Bedrock slot layout.
        let mut items = vec![bedrock::ItemStack::EMPTY; 36];
        for (java_slot, slot) in packet.slots.iter().enumerate() {
            if let Some(bedrock_slot) = remap_player_slot(java_slot as i16) {
                items[bedrock_slot as usize] = to_bedrock_item(ctx, slot);
            }
        }
        session.send_bedrock(Packet::InventoryContent(bedrock::InventoryContent {
            window_id: 0,
            items,
        }));
        return Ok(());
    }

    let items: Vec<bedrock::ItemStack> = packet
        .slots
        .iter()
        .map(|slot| to_bedrock_item(ctx, slot))
        .collect();
    let window_id = packet.window_id;
    let contents = match session.window_mut(window_id) {
        Some(window) => {
            let visible = items.len().min(window.slot_count);
            window.contents = items[..visible].to_vec();
            window.contents.clone()
        }
        None => {
            tracing::debug!(window = window_id, "contents for unknown window");
            return Ok(());
        }
    };
    session.send_bedrock(Packet::InventoryContent(bedrock::InventoryContent {
        window_id: u32::from(window_id),
        items: contents,
    }));
    Ok(())
}

pub fn set_slot(
    session: &mut Session,
    ctx: &ProxyContext,
    packet: play::SetSlot,
) -> anyhow::Result<()> {
    if packet.window_id < 0 {
        // Cursor updates (-1) are not mirrored.
        return Ok(());
    }
    let item = to_bedrock_item(ctx, &packet.item);
    let window_id = packet.window_id as u8;

    if window_id == 0 {
        let Some(bedrock_slot) = remap_player_slot(packet.slot) else {
            return Ok(());
        };
        session.send_bedrock(Packet::InventorySlot(bedrock::InventorySlot {
            window_id: 0,
            slot: bedrock_slot,
            item,
        }));
        return Ok(());
    }

    let Some(window) = session.window_mut(window_id) else {
        return Ok(());
    };
    let slot = packet.slot.max(0) as usize;
    if slot < window.contents.len() {
        window.contents[slot] = item.clone();
    }
    session.send_bedrock(Packet::InventorySlot(bedrock::InventorySlot {
        window_id: u32::from(window_id),
        slot: packet.slot.max(0) as u32,
        item,
    }));
    Ok(())
}

pub fn close_window(session: &mut Session, packet: play::CloseWindow) -> anyhow::Result<()> {
    session.close_window(packet.window_id);
    session.send_bedrock(Packet::ContainerClose(bedrock::ContainerClose {
        window_id: packet.window_id,
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_hotbar_moves_to_the_front() {
        assert_eq!(remap_player_slot(36), Some(0));
        assert_eq!(remap_player_slot(44), Some(8));
        assert_eq!(remap_player_slot(9), Some(9));
        assert_eq!(remap_player_slot(35), Some(35));
        // Crafting grid and armor are not mirrored.
        assert_eq!(remap_player_slot(0), None);
        assert_eq!(remap_player_slot(5), None);
        assert_eq!(remap_player_slot(45), None);
    }

    #[test]
    fn window_kinds_cover_the_common_cases() {
        assert_eq!(map_window_kind(2), (container_kind::CONTAINER, 27));
        assert_eq!(map_window_kind(5), (container_kind::CONTAINER, 54));
        assert_eq!(map_window_kind(14), (container_kind::FURNACE, 3));
        assert_eq!(map_window_kind(99), (container_kind::CONTAINER, 27));
    }
}
