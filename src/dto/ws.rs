use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        room::RoomSnapshot,
        validation::{validate_nick, validate_room_id},
    },
    state::{game::Mark, room::Role},
};

/// Why an inbound frame could not be turned into a [`ClientMessage`].
#[derive(Debug, Error)]
pub enum InboundError {
    /// Not JSON, or not one of the known message shapes.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A `type` tag this server does not handle.
    #[error("unsupported message type")]
    Unsupported,
    /// Well-formed but carrying invalid field values.
    #[error("invalid message: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Deserialize, ToSchema)]
/// Messages accepted from game clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create or join a room.
    Join(JoinRequest),
    /// Play a cell.
    Move(MoveRequest),
    /// Start a new game in the room.
    Reset(RoomRequest),
    /// Leave the room, keeping the connection.
    Leave(RoomRequest),
    /// Change the nickname.
    SetNick(SetNickRequest),
    /// Any other `type` tag.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse and validate a text frame.
    pub fn from_json_str(text: &str) -> Result<Self, InboundError> {
        let mut message: Self = serde_json::from_str(text)?;
        match &mut message {
            Self::Unknown => return Err(InboundError::Unsupported),
            Self::Join(request) => request.normalize(),
            _ => {}
        }
        message.validate()?;
        Ok(message)
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Move(_) => "move",
            Self::Reset(_) => "reset",
            Self::Leave(_) => "leave",
            Self::SetNick(_) => "set_nick",
            Self::Unknown => "unknown",
        }
    }
}

impl Validate for ClientMessage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::Join(request) => request.validate(),
            Self::Move(request) => request.validate(),
            Self::Reset(request) | Self::Leave(request) => request.validate(),
            Self::SetNick(request) => request.validate(),
            Self::Unknown => Ok(()),
        }
    }
}

/// Create or join a room.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    /// Omitted, `null` or empty: create a new room.
    #[serde(default)]
    pub room_id: Option<String>,
    /// Defaults to `player`.
    #[serde(default)]
    pub role: Option<Role>,
    /// Omitted, `null` or empty: reuse the nickname set earlier, or a generated one.
    #[serde(default)]
    pub nick: Option<String>,
}

impl JoinRequest {
    /// Treat empty strings like missing values.
    fn normalize(&mut self) {
        self.room_id = self.room_id.take().filter(|room_id| !room_id.is_empty());
        self.nick = self.nick.take().filter(|nick| !nick.is_empty());
    }
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref room_id) = self.room_id {
            if let Err(e) = validate_room_id(room_id) {
                errors.add("roomId", e);
            }
        }

        if let Some(ref nick) = self.nick {
            if let Err(e) = validate_nick(nick) {
                errors.add("nick", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Place the current player's symbol.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Room the move is played in.
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
    /// Range-checked by the game rules so the rejection names the board.
    pub board_index: i64,
    /// Cell inside the board; also selects the opponent's next board.
    pub cell_index: i64,
}

/// Messages that only name a room (`reset`, `leave`).
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    /// Target room.
    #[validate(custom(function = "validate_room_id"))]
    pub room_id: String,
}

/// Choose the nickname used by later joins.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetNickRequest {
    /// New display name.
    #[validate(custom(function = "validate_nick"))]
    pub nick: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Messages pushed to game clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Private join acknowledgement.
    Joined(JoinedMessage),
    /// Broadcast snapshot.
    State(StateMessage),
    /// Private leave acknowledgement.
    Left(LeftMessage),
    /// Private rejection.
    Error(ErrorMessage),
}

impl ServerMessage {
    /// Private error reply.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorMessage {
            message: message.into(),
        })
    }
}

/// Private acknowledgement sent to a connection that joined a room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMessage {
    /// Room that was joined or created.
    pub room_id: String,
    /// Identifier assigned to the connection.
    pub client_id: String,
    /// Slot held, `null` for spectators.
    pub symbol: Option<Mark>,
    /// Role after slot assignment.
    pub role: Role,
    /// Snapshot at join time.
    pub state: RoomSnapshot,
}

/// Room snapshot broadcast to every member.
#[derive(Debug, Serialize, ToSchema)]
pub struct StateMessage {
    /// Current room snapshot.
    pub state: RoomSnapshot,
}

/// Private acknowledgement of a `leave`; the socket stays open.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeftMessage {
    /// Room that was left.
    pub room_id: String,
}

/// Private rejection of the last message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorMessage {
    /// Reason the message was refused.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn join_without_room_or_role_defaults() {
        let message = ClientMessage::from_json_str(r#"{"type":"join","roomId":null}"#).unwrap();
        let ClientMessage::Join(join) = message else {
            panic!("expected join");
        };
        assert_eq!(join.room_id, None);
        assert_eq!(join.role, None);
        assert_eq!(join.nick, None);
    }

    #[test]
    fn empty_room_id_means_create() {
        let message =
            ClientMessage::from_json_str(r#"{"type":"join","roomId":"","role":"spectator","nick":""}"#)
                .unwrap();
        let ClientMessage::Join(join) = message else {
            panic!("expected join");
        };
        assert_eq!(join.room_id, None);
        assert_eq!(join.role, Some(Role::Spectator));
        assert_eq!(join.nick, None);
    }

    #[test]
    fn move_fields_are_camel_case() {
        let message = ClientMessage::from_json_str(
            r#"{"type":"move","roomId":"a1b2c3","boardIndex":4,"cellIndex":0}"#,
        )
        .unwrap();
        let ClientMessage::Move(request) = message else {
            panic!("expected move");
        };
        assert_eq!(request.room_id, "a1b2c3");
        assert_eq!((request.board_index, request.cell_index), (4, 0));
    }

    #[test]
    fn unknown_type_is_unsupported() {
        let err = ClientMessage::from_json_str(r#"{"type":"chat","text":"hi"}"#).unwrap_err();
        assert!(matches!(err, InboundError::Unsupported));
    }

    #[test]
    fn garbage_is_malformed() {
        for text in ["not json", "{}", r#"{"type":"move","roomId":"a1b2c3"}"#, "42"] {
            let err = ClientMessage::from_json_str(text).unwrap_err();
            assert!(matches!(err, InboundError::Malformed(_)), "{text}: {err}");
        }
    }

    #[test]
    fn invalid_fields_are_reported() {
        let err = ClientMessage::from_json_str(r#"{"type":"reset","roomId":"NOPE"}"#).unwrap_err();
        assert!(matches!(err, InboundError::Invalid(_)));

        let long_nick = "n".repeat(40);
        let text = json!({"type": "set_nick", "nick": long_nick}).to_string();
        let err = ClientMessage::from_json_str(&text).unwrap_err();
        assert!(matches!(err, InboundError::Invalid(_)));
    }

    #[test]
    fn server_messages_are_tagged() {
        let value = serde_json::to_value(ServerMessage::error("not your turn")).unwrap();
        assert_eq!(value, json!({"type": "error", "message": "not your turn"}));

        let value = serde_json::to_value(ServerMessage::Left(LeftMessage {
            room_id: "a1b2c3".into(),
        }))
        .unwrap();
        assert_eq!(value, json!({"type": "left", "roomId": "a1b2c3"}));
    }
}
