/// A model movement bound to one key.
///
/// The table is closed: every bound key maps to exactly one variant and the
/// mapper matches on the variant exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveAction {
    /// Translate along the model's facing.
    Forward,
    /// Translate against the model's facing.
    Backward,
    StrafeLeft,
    StrafeRight,
    /// Raise the model.
    Ascend,
    /// Lower the model, never below the floor.
    Descend,
    /// Turn counter-clockwise seen from above.
    YawLeft,
    /// Turn clockwise seen from above.
    YawRight,
}

impl MoveAction {
    pub const ALL: [MoveAction; 8] = [
        MoveAction::Forward,
        MoveAction::Backward,
        MoveAction::StrafeLeft,
        MoveAction::StrafeRight,
        MoveAction::Ascend,
        MoveAction::Descend,
        MoveAction::YawLeft,
        MoveAction::YawRight,
    ];

    /// Look up the action bound to a key identifier (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key.to_lowercase().as_str() {
            "w" => MoveAction::Forward,
            "s" => MoveAction::Backward,
            "a" => MoveAction::StrafeLeft,
            "d" => MoveAction::StrafeRight,
            "arrowup" => MoveAction::Ascend,
            "arrowdown" => MoveAction::Descend,
            "q" => MoveAction::YawLeft,
            "e" => MoveAction::YawRight,
            _ => return None,
        };
        Some(action)
    }

    /// The key identifier this action is bound to.
    pub fn key(self) -> &'static str {
        match self {
            MoveAction::Forward => "w",
            MoveAction::Backward => "s",
            MoveAction::StrafeLeft => "a",
            MoveAction::StrafeRight => "d",
            MoveAction::Ascend => "arrowup",
            MoveAction::Descend => "arrowdown",
            MoveAction::YawLeft => "q",
            MoveAction::YawRight => "e",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoveAction::Forward => "forward",
            MoveAction::Backward => "backward",
            MoveAction::StrafeLeft => "strafe left",
            MoveAction::StrafeRight => "strafe right",
            MoveAction::Ascend => "ascend",
            MoveAction::Descend => "descend",
            MoveAction::YawLeft => "turn left",
            MoveAction::YawRight => "turn right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_round_trips_through_its_key() {
        for action in MoveAction::ALL {
            assert_eq!(MoveAction::from_key(action.key()), Some(action));
        }
    }

    #[test]
    fn key_lookup_is_case_insensitive() {
        assert_eq!(MoveAction::from_key("W"), Some(MoveAction::Forward));
        assert_eq!(MoveAction::from_key("ArrowDown"), Some(MoveAction::Descend));
    }

    #[test]
    fn unbound_keys_have_no_action() {
        assert_eq!(MoveAction::from_key("x"), None);
        assert_eq!(MoveAction::from_key(" "), None);
        assert_eq!(MoveAction::from_key("shift"), None);
    }
}
