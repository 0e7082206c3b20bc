//! UI forms shown on the Bedrock client.
//!
//! A form is serialized to JSON, sent with a session-unique id, and
//! answered (or cancelled) by a single `ModalFormResponse`. The
//! response payload is the raw JSON value; `null` means the player
//! closed the form.

use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub enum Form {
    /// A list of buttons under a body text.
    Simple {
        title: String,
        content: String,
        buttons: Vec<Button>,
    },
    /// A yes/no dialog.
    Modal {
        title: String,
        content: String,
        yes_button: String,
        no_button: String,
    },
    /// A vertical stack of input elements.
    Custom {
        title: String,
        elements: Vec<Element>,
    },
}

#[derive(Debug, Clone)]
pub struct Button {
    pub text: String,
    /// Optional image URL shown next to the button.
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Element {
    Label { text: String },
    Input { text: String, placeholder: String },
    Toggle { text: String, default: bool },
}

impl Form {
    pub fn serialize(&self) -> Value {
        match self {
            Form::Simple {
                title,
                content,
                buttons,
            } => json!({
                "type": "form",
                "title": title,
                "content": content,
                "buttons": buttons.iter().map(Button::serialize).collect::<Vec<_>>(),
            }),
            Form::Modal {
                title,
                content,
                yes_button,
                no_button,
            } => json!({
                "type": "modal",
                "title": title,
                "content": content,
                "button1": yes_button,
                "button2": no_button,
            }),
            Form::Custom { title, elements } => json!({
                "type": "custom_form",
                "title": title,
                "content": elements.iter().map(Element::serialize).collect::<Vec<_>>(),
            }),
        }
    }
}

impl Button {
    fn serialize(&self) -> Value {
        match &self.image {
            Some(url) => json!({
                "text": self.text,
                "image": { "type": "url", "data": url },
            }),
            None => json!({ "text": self.text }),
        }
    }
}

impl Element {
    fn serialize(&self) -> Value {
        match self {
            Element::Label { text } => json!({ "type": "label", "text": text }),
            Element::Input { text, placeholder } => json!({
                "type": "input",
                "text": text,
                "placeholder": placeholder,
            }),
            Element::Toggle { text, default } => json!({
                "type": "toggle",
                "text": text,
                "default": default,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_form_serializes_buttons_in_order() {
        let form = Form::Simple {
            title: "Server menu".into(),
            content: "Pick one".into(),
            buttons: vec![
                Button {
                    text: "Yes".into(),
                    image: None,
                },
                Button {
                    text: "No".into(),
                    image: Some("https://example.org/no.png".into()),
                },
            ],
        };
        let value = form.serialize();
        assert_eq!(value["type"], "form");
        assert_eq!(value["buttons"][0]["text"], "Yes");
        assert_eq!(value["buttons"][1]["image"]["type"], "url");
    }

    #[test]
    fn custom_form_serializes_each_element_kind() {
        let form = Form::Custom {
            title: "Settings".into(),
            elements: vec![
                Element::Label {
                    text: "General".into(),
                },
                Element::Input {
                    text: "Name".into(),
                    placeholder: "Steve".into(),
                },
                Element::Toggle {
                    text: "Enabled".into(),
                    default: true,
                },
            ],
        };
        let value = form.serialize();
        assert_eq!(value["type"], "custom_form");
        assert_eq!(value["content"][0]["type"], "label");
        assert_eq!(value["content"][1]["placeholder"], "Steve");
        assert_eq!(value["content"][2]["default"], true);
    }

    #[test]
    fn modal_form_uses_two_buttons() {
        let form = Form::Modal {
            title: "t".into(),
            content: "c".into(),
            yes_button: "Accept".into(),
            no_button: "Decline".into(),
        };
        let value = form.serialize();
        assert_eq!(value["type"], "modal");
        assert_eq!(value["button1"], "Accept");
        assert_eq!(value["button2"], "Decline");
    }
}
