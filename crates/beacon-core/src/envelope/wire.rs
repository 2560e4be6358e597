//! Newline-delimited envelope framing
//!
//! ```text
//! {"event_id":"9ec79c33ec9942ab8353589fcb2e04dc"}\n
//! {"type":"event","length":41,"content_type":"application/json"}\n
//! <41 payload bytes>\n
//! {"type":"attachment","length":5,"filename":"a.txt"}\n
//! <5 payload bytes>\n
//! ```
//!
//! The envelope header and every item header are single-line JSON objects.
//! Writers always emit an explicit `length`, so payloads may contain newlines.
//! Readers also accept items without a `length`, whose payload then runs to the
//! next newline.

use std::io::Write;

use super::{Envelope, EnvelopeHeader, EnvelopeItem, ItemHeader};
use crate::errors::{BeaconError, Result};

/// Split at the first newline, dropping the newline itself
fn split_line(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&b| b == b'\n') {
        Some(pos) => (&bytes[..pos], &bytes[pos + 1..]),
        None => (bytes, &[][..]),
    }
}

impl Envelope {
    /// Write the framed envelope to `writer`
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer(&mut writer, &self.header)?;
        writer.write_all(b"\n")?;

        for item in &self.items {
            serde_json::to_writer(&mut writer, item.header())?;
            writer.write_all(b"\n")?;
            writer.write_all(item.payload())?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Frame the envelope into a byte vector
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Parse a framed envelope
    pub fn parse(bytes: &[u8]) -> Result<Envelope> {
        let (header_line, mut rest) = split_line(bytes);
        let header: EnvelopeHeader = serde_json::from_slice(header_line)
            .map_err(|e| BeaconError::invalid_envelope(format!("bad envelope header: {e}")))?;

        let mut envelope = Envelope::with_header(header);
        while !rest.is_empty() {
            let (header_line, after_header) = split_line(rest);
            if header_line.is_empty() {
                if after_header.is_empty() {
                    break;
                }
                return Err(BeaconError::invalid_envelope(format!(
                    "empty item header before item {}",
                    envelope.len()
                )));
            }

            let item_header: ItemHeader = serde_json::from_slice(header_line).map_err(|e| {
                BeaconError::invalid_envelope(format!(
                    "bad header for item {}: {e}",
                    envelope.len()
                ))
            })?;

            let (payload, after_payload) = match item_header.length {
                Some(length) => {
                    if after_header.len() < length {
                        return Err(BeaconError::invalid_envelope(format!(
                            "item {} declares {length} bytes but only {} remain",
                            envelope.len(),
                            after_header.len()
                        )));
                    }
                    let (payload, tail) = after_header.split_at(length);
                    let tail = match tail.split_first() {
                        Some((&b'\n', tail)) => tail,
                        None => tail,
                        Some(_) => {
                            return Err(BeaconError::invalid_envelope(format!(
                                "item {} is not followed by a newline",
                                envelope.len()
                            )))
                        }
                    };
                    (payload, tail)
                }
                None => split_line(after_header),
            };

            envelope.add_item(EnvelopeItem::from_parts(item_header, payload.to_vec()));
            rest = after_payload;
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ItemType;
    use crate::protocol::Event;

    #[test]
    fn framed_layout() {
        let mut envelope = Envelope::new();
        envelope.add_item(EnvelopeItem::new(ItemType::Session, b"{}".to_vec()));
        let bytes = envelope.to_vec().unwrap();
        assert_eq!(
            bytes,
            b"{}\n{\"type\":\"session\",\"length\":2}\n{}\n".to_vec()
        );
    }

    #[test]
    fn parses_items_without_length() {
        let raw = b"{}\n{\"type\":\"attachment\"}\nhello\n{\"type\":\"session\"}\n{}";
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(envelope.len(), 2);
        assert_eq!(envelope.items()[0].payload(), b"hello");
        assert_eq!(envelope.items()[0].header().length, Some(5));
        assert_eq!(envelope.items()[1].item_type(), &ItemType::Session);
    }

    #[test]
    fn header_only_envelope() {
        let envelope = Envelope::parse(b"{\"event_id\":\"9ec79c33ec9942ab8353589fcb2e04dc\"}\n")
            .unwrap();
        assert!(envelope.is_empty());
        assert!(envelope.event_id().is_some());
    }

    #[test]
    fn rejects_truncated_payload() {
        let raw = b"{}\n{\"type\":\"event\",\"length\":100}\n{}\n";
        assert!(matches!(
            Envelope::parse(raw),
            Err(BeaconError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn rejects_missing_separator() {
        let raw = b"{}\n{\"type\":\"event\",\"length\":2}\n{}X";
        assert!(Envelope::parse(raw).is_err());
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(Envelope::parse(b"").is_err());
        assert!(Envelope::parse(b"not json\n").is_err());
        assert!(Envelope::parse(b"{}\n{\"length\":2}\n{}\n").is_err());
    }

    #[test]
    fn parsed_event_decodes() {
        let event = Event::new().with_message("parsed");
        let envelope = Envelope::from_payload(&event).unwrap();
        let parsed = Envelope::parse(&envelope.to_vec().unwrap()).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.typed::<Event>(), Some(event));
    }
}
