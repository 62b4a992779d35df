//! JSON-lines event feed.
//!
//! Each non-blank line is one record:
//!
//! ```text
//! {"type":"spawn","id":1,"designer_name":"Viper 1-1","coalition":2,"group":{"name":"Viper","category":"airplane"}}
//! {"type":"weapon","id":100,"name":"AIM-120C","type_name":"AIM_120C"}
//! {"type":"event","time":12.5,"event":{"kind":"shot","initiator":1,"weapon":100}}
//! {"type":"despawn","id":1}
//! ```
//!
//! Malformed lines are logged and skipped. A read error ends the feed.

use futures::Stream;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use killboard_core::SessionInput;
use killboard_identity::{EntityInfo, WeaponInfo};
use killboard_types::{EventEnvelope, RawActorId};

/// Errors that can occur while reading the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed could not be opened or read.
    #[error("feed I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A line was not a valid record.
    #[error("line {line}: {source}")]
    Parse {
        /// One-based line number.
        line: u64,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// One line of the feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedRecord {
    /// An entity appeared.
    Spawn(EntityInfo),
    /// An entity left the world.
    Despawn {
        /// The departed entity.
        id: RawActorId,
    },
    /// A weapon object became inspectable.
    Weapon(WeaponInfo),
    /// A combat event.
    Event(EventEnvelope),
}

impl From<FeedRecord> for SessionInput {
    fn from(record: FeedRecord) -> Self {
        match record {
            FeedRecord::Spawn(entity) => Self::Spawn(entity),
            FeedRecord::Despawn { id } => Self::Despawn(id),
            FeedRecord::Weapon(weapon) => Self::Weapon(weapon),
            FeedRecord::Event(envelope) => Self::Event(envelope),
        }
    }
}

/// Parse one line. Blank lines yield `None`.
pub fn parse_line(text: &str, line: u64) -> Result<Option<FeedRecord>, FeedError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(|source| FeedError::Parse { line, source })
}

/// Turn a line reader into a stream of session inputs.
pub fn records<R>(reader: R) -> impl Stream<Item = SessionInput>
where
    R: AsyncBufRead + Unpin,
{
    futures::stream::unfold((reader.lines(), 0_u64), |(mut lines, mut line)| async move {
        loop {
            line = line.saturating_add(1);
            match lines.next_line().await {
                Ok(Some(text)) => match parse_line(&text, line) {
                    Ok(Some(record)) => return Some((SessionInput::from(record), (lines, line))),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Skipping malformed feed line"),
                },
                Ok(None) => return None,
                Err(e) => {
                    warn!(error = %FeedError::from(e), line, "Feed read failed, ending feed");
                    return None;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use killboard_types::{CombatEvent, Engagement, GroupCategory, RawWeaponId};

    use super::*;

    #[test]
    fn parse_spawn_line() {
        let line = r#"{"type":"spawn","id":7,"designer_name":"Viper 1-1","coalition":2,"group":{"name":"Viper","category":"airplane"}}"#;
        let entity = match parse_line(line, 1) {
            Ok(Some(FeedRecord::Spawn(entity))) => Some(entity),
            _ => None,
        };
        assert!(entity.is_some(), "expected a spawn record");
        let Some(entity) = entity else { return };
        assert_eq!(entity.id, RawActorId(7));
        assert_eq!(entity.designer_name.as_deref(), Some("Viper 1-1"));
        assert_eq!(entity.player_name, None);
        assert_eq!(
            entity.group.and_then(|g| g.category),
            Some(GroupCategory::Airplane)
        );
    }

    #[test]
    fn parse_event_line() {
        let line = r#"{"type":"event","time":12.5,"event":{"kind":"hit","initiator":1,"target":2,"weapon":100}}"#;
        let record = parse_line(line, 1).ok().flatten().map(SessionInput::from);
        let expected = SessionInput::Event(EventEnvelope {
            time: 12.5,
            event: CombatEvent::Hit(Engagement {
                initiator: Some(RawActorId(1)),
                target: Some(RawActorId(2)),
                weapon: Some(RawWeaponId(100)),
            }),
        });
        assert_eq!(record, Some(expected));
    }

    #[test]
    fn unknown_event_kind_is_other() {
        let line = r#"{"type":"event","event":{"kind":"takeoff","initiator":1}}"#;
        let record = parse_line(line, 1).ok().flatten();
        assert!(matches!(
            record,
            Some(FeedRecord::Event(EventEnvelope {
                event: CombatEvent::Other,
                ..
            }))
        ));
    }

    #[test]
    fn parse_despawn_and_weapon() {
        assert_eq!(
            parse_line(r#"{"type":"despawn","id":3}"#, 1).ok().flatten(),
            Some(FeedRecord::Despawn { id: RawActorId(3) })
        );
        let weapon = parse_line(r#"{"type":"weapon","id":9}"#, 1).ok().flatten();
        assert_eq!(
            weapon,
            Some(FeedRecord::Weapon(WeaponInfo {
                id: RawWeaponId(9),
                name: None,
                type_name: None,
            }))
        );
    }

    #[test]
    fn blank_line_is_skipped() {
        assert!(matches!(parse_line("   ", 4), Ok(None)));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let result = parse_line("{not json", 12);
        assert!(matches!(result, Err(FeedError::Parse { line: 12, .. })));
    }

    #[tokio::test]
    async fn stream_skips_bad_lines() {
        let feed: &[u8] = b"{\"type\":\"despawn\",\"id\":1}\n\ngarbage\n{\"type\":\"despawn\",\"id\":2}\n";
        let inputs: Vec<SessionInput> = records(feed).collect().await;
        assert_eq!(
            inputs,
            vec![
                SessionInput::Despawn(RawActorId(1)),
                SessionInput::Despawn(RawActorId(2)),
            ]
        );
    }
}
