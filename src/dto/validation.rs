//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::ids::ROOM_ID_LEN;

/// Longest accepted nickname, in characters.
pub const NICK_MAX_CHARS: usize = 32;

/// Validates that a room ID is exactly 6 lowercase hexadecimal characters.
///
/// # Examples
///
/// ```ignore
/// validate_room_id("a1b2c3") // Ok
/// validate_room_id("A1B2C3") // Err - uppercase
/// validate_room_id("a1b2c")  // Err - too short
/// ```
pub fn validate_room_id(id: &str) -> Result<(), ValidationError> {
    if id.len() != ROOM_ID_LEN {
        let mut err = ValidationError::new("room_id_length");
        err.message = Some(
            format!(
                "Room ID must be exactly {ROOM_ID_LEN} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    {
        let mut err = ValidationError::new("room_id_format");
        err.message = Some("Room ID must contain only lowercase hexadecimal characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a nickname is non-blank and at most [`NICK_MAX_CHARS`] characters.
pub fn validate_nick(nick: &str) -> Result<(), ValidationError> {
    if nick.trim().is_empty() {
        let mut err = ValidationError::new("nick_blank");
        err.message = Some("Nickname must not be blank".into());
        return Err(err);
    }

    let count = nick.chars().count();
    if count > NICK_MAX_CHARS {
        let mut err = ValidationError::new("nick_length");
        err.message = Some(
            format!("Nickname must be at most {NICK_MAX_CHARS} characters (got {count})").into(),
        );
        return Err(err);
    }

    Ok(())
}
