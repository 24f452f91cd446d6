// crates/pad-core/tests/game_definition.rs
use pad_core::code::CODE_LEN;
use pad_core::{GameDefinition, GameError, KeyCode, SessionCode, SlotLabel};
use rand::rngs::StdRng;
use rand::SeedableRng;

const CATALOG_ENTRY: &str = r#"{
    "id": 3,
    "name": "Pong",
    "url": "pong",
    "numOfPlayers": 2,
    "keys": 2,
    "keyBindings": {
        "player1": { "up": "w", "down": "s" },
        "player2": { "up": "up", "down": "down" }
    }
}"#;

#[test]
fn parses_catalog_entry() {
    let game: GameDefinition = serde_json::from_str(CATALOG_ENTRY).unwrap();
    assert_eq!(game.id.as_str(), "3");
    assert_eq!(game.name, "Pong");
    assert_eq!(game.num_of_players, 2);
    assert_eq!(game.keys, 2);
    assert!(game.validate().is_ok());

    let p1 = SlotLabel::new(1).unwrap();
    let p2 = SlotLabel::new(2).unwrap();
    assert_eq!(game.binding(p1, "down"), Some(&KeyCode::new("s")));
    assert_eq!(game.binding(p2, "up"), Some(&KeyCode::new("up")));
    assert_eq!(game.binding(p2, "fire"), None);
    assert_eq!(game.binding(SlotLabel::new(3).unwrap(), "up"), None);
}

#[test]
fn string_ids_are_accepted() {
    let json = r#"{"id":"snake","name":"Snake","numOfPlayers":1,"keys":4,"keyBindings":{}}"#;
    let game: GameDefinition = serde_json::from_str(json).unwrap();
    assert_eq!(game.id.to_string(), "snake");
    assert!(game.key_bindings.is_empty());
}

#[test]
fn zero_players_fails_validation() {
    let json = r#"{"id":1,"name":"Nobody","numOfPlayers":0,"keys":2,"keyBindings":{}}"#;
    let game: GameDefinition = serde_json::from_str(json).unwrap();
    assert_eq!(game.validate(), Err(GameError::NoPlayers("1".to_string())));
}

#[test]
fn missing_fields_fail_to_parse() {
    let json = r#"{"id":1,"name":"Broken","keys":2}"#;
    assert!(serde_json::from_str::<GameDefinition>(json).is_err());
}

#[test]
fn slot_labels_parse_and_print() {
    let slot: SlotLabel = "player12".parse().unwrap();
    assert_eq!(slot.number(), 12);
    assert_eq!(slot.to_string(), "player12");
    assert!("player0".parse::<SlotLabel>().is_err());
    assert!("spectator".parse::<SlotLabel>().is_err());
    assert!(SlotLabel::new(0).is_none());
}

#[test]
fn generated_codes_are_five_lowercase_letters() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let code = SessionCode::generate(&mut rng);
        assert_eq!(code.as_str().len(), CODE_LEN);
        assert!(code.as_str().bytes().all(|b| b.is_ascii_lowercase()));
        assert_eq!(code.as_str().parse::<SessionCode>(), Ok(code.clone()));
    }
}

#[test]
fn malformed_codes_do_not_parse() {
    assert!("abcd".parse::<SessionCode>().is_err());
    assert!("abcdef".parse::<SessionCode>().is_err());
    assert!("ABCDE".parse::<SessionCode>().is_err());
    assert!("ab1de".parse::<SessionCode>().is_err());
}
