use minecraft_bedrock_proxy_macros::{Decode, Encode};

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Serverbound {
    #[encoding(id = 0x00)]
    LoginStart(LoginStart),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginStart {
    pub username: String,
}

#[derive(Debug, Clone, Encode, Decode, strum::AsRefStr)]
#[encoding(discriminant = "varint")]
pub enum Clientbound {
    #[encoding(id = 0x00)]
    Disconnect(Disconnect),
    #[encoding(id = 0x01)]
    EncryptionRequest(EncryptionRequest),
    #[encoding(id = 0x02)]
    LoginSuccess(LoginSuccess),
    #[encoding(id = 0x03)]
    SetCompression(SetCompression),
    #[encoding(id = 0x04)]
    LoginPluginRequest(LoginPluginRequest),
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Disconnect {
    /// Chat-JSON kick reason.
    pub reason: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct EncryptionRequest {
    pub server_id: String,
    #[encoding(length_prefix = "varint")]
    pub public_key: Vec<u8>,
    #[encoding(length_prefix = "varint")]
    pub verify_token: Vec<u8>,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginSuccess {
    pub uuid: String,
    pub username: String,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct SetCompression {
    #[encoding(varint)]
    pub threshold: i32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct LoginPluginRequest {
    #[encoding(varint)]
    pub message_id: i32,
    pub channel: String,
    #[encoding(length_prefix = "inferred")]
    pub data: Vec<u8>,
}
