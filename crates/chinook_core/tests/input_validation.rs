use chinook_core::validate::{DEFAULT_MAX_INPUT_CHARS, TITLE_MAX_CHARS};
use chinook_core::{
    validate_menu_choice, validate_positive_integer, validate_string, Rejection,
    ValidationPolicy,
};

const SAFE_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 '-&()!?.,/";

#[test]
fn every_disallowed_character_is_rejected_wherever_it_appears() {
    for bad in [';', '"', '\\'] {
        for raw in [
            format!("{bad}"),
            format!("{bad}title"),
            format!("title{bad}"),
            format!("ti{bad}tle"),
        ] {
            let err = validate_string(&raw, "Album title", TITLE_MAX_CHARS).unwrap_err();
            assert_eq!(
                err.reason,
                Rejection::DisallowedCharacters(vec![bad]),
                "{raw:?}"
            );
        }
    }
}

#[test]
fn control_characters_are_rejected() {
    for code in 0_u8..0x20 {
        let ch = char::from(code);
        if ch.is_whitespace() {
            // Leading/trailing whitespace is trimmed, so embed it.
            let raw = format!("a{ch}b");
            let err = validate_string(&raw, "Album title", TITLE_MAX_CHARS).unwrap_err();
            assert_eq!(err.reason, Rejection::ControlCharacter, "{code:#04x}");
        } else {
            let raw = format!("{ch}title");
            let err = validate_string(&raw, "Album title", TITLE_MAX_CHARS).unwrap_err();
            assert_eq!(err.reason, Rejection::ControlCharacter, "{code:#04x}");
        }
    }
}

#[test]
fn safe_text_is_accepted_and_trimmed() {
    let chars = SAFE_ALPHABET.chars().collect::<Vec<_>>();
    for window in chars.chunks(7) {
        let body = window.iter().collect::<String>();
        if body.trim().is_empty() {
            continue;
        }
        let raw = format!("  {body}\t");
        assert_eq!(
            validate_string(&raw, "Album title", TITLE_MAX_CHARS),
            Ok(body.trim().to_string())
        );
    }
    assert_eq!(
        validate_string("Rock 'n' Roll", "Album title", TITLE_MAX_CHARS),
        Ok("Rock 'n' Roll".to_string())
    );
}

#[test]
fn length_bound_counts_characters_after_trimming() {
    let at_limit = "é".repeat(TITLE_MAX_CHARS);
    assert!(validate_string(&at_limit, "Album title", TITLE_MAX_CHARS).is_ok());

    let padded = format!("   {at_limit}   ");
    assert!(validate_string(&padded, "Album title", TITLE_MAX_CHARS).is_ok());

    let over = "é".repeat(TITLE_MAX_CHARS + 1);
    assert_eq!(
        validate_string(&over, "Album title", TITLE_MAX_CHARS)
            .unwrap_err()
            .reason,
        Rejection::TooLong {
            max: TITLE_MAX_CHARS
        }
    );
}

#[test]
fn default_policy_uses_general_input_bound() {
    let policy = ValidationPolicy::default();
    assert!(policy
        .validate_string(&"a".repeat(DEFAULT_MAX_INPUT_CHARS), "Name")
        .is_ok());
    assert!(policy
        .validate_string(&"a".repeat(DEFAULT_MAX_INPUT_CHARS + 1), "Name")
        .is_err());
}

#[test]
fn custom_policy_changes_the_disallowed_set() {
    let policy = ValidationPolicy::default().with_disallowed_chars(['%', '_']);
    assert!(policy.validate_string("semi;colon", "Search term").is_ok());
    assert_eq!(
        policy
            .validate_string("100%_sure", "Search term")
            .unwrap_err()
            .reason,
        Rejection::DisallowedCharacters(vec!['%', '_'])
    );
}

#[test]
fn positive_integers_across_the_range() {
    for value in [1_i64, 2, 347, 1 << 31, i64::MAX - 1, i64::MAX] {
        assert_eq!(
            validate_positive_integer(&value.to_string(), "Album ID"),
            Ok(value)
        );
        assert_eq!(validate_positive_integer(&value, "Album ID"), Ok(value));
    }

    for value in [0_i64, -1, -347, i64::MIN] {
        assert_eq!(
            validate_positive_integer(&value.to_string(), "Album ID")
                .unwrap_err()
                .reason,
            Rejection::NotPositive
        );
        assert_eq!(
            validate_positive_integer(&value, "Album ID")
                .unwrap_err()
                .reason,
            Rejection::NotPositive
        );
    }
}

#[test]
fn non_numeric_text_is_rejected() {
    for raw in ["abc", "1e3", "0x10", "1_000", "١٢", "--1", "1-", "12 34"] {
        assert_eq!(
            validate_positive_integer(raw, "Album ID")
                .unwrap_err()
                .reason,
            Rejection::NotNumeric,
            "{raw:?}"
        );
    }
}

#[test]
fn menu_choices_stay_within_bounds() {
    for choice in 1..=8 {
        assert_eq!(
            validate_menu_choice(&choice.to_string(), 1, 8),
            Ok(i64::from(choice))
        );
    }
    for raw in ["0", "9", "-5", "99999999999999999999"] {
        assert_eq!(
            validate_menu_choice(raw, 1, 8).unwrap_err().reason,
            Rejection::OutOfRange { min: 1, max: 8 },
            "{raw:?}"
        );
    }
}
