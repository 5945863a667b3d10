use ghostwriter::keycodes::{keystroke_for_char, KEY_ENTER, KEY_SPACE, KEY_TAB};

#[test]
fn letters_share_a_keycode_across_case() {
    let lower = keystroke_for_char('a').expect("'a' maps");
    let upper = keystroke_for_char('A').expect("'A' maps");

    assert_eq!(lower.keycode, upper.keycode);
    assert!(!lower.shift);
    assert!(upper.shift);
}

#[test]
fn shifted_digits_produce_symbols() {
    let one = keystroke_for_char('1').expect("'1' maps");
    let bang = keystroke_for_char('!').expect("'!' maps");

    assert_eq!(one.keycode, bang.keycode);
    assert!(!one.shift);
    assert!(bang.shift);
}

#[test]
fn control_characters_map_to_their_keys() {
    assert_eq!(keystroke_for_char('\n').expect("newline").keycode, KEY_ENTER);
    assert_eq!(keystroke_for_char('\t').expect("tab").keycode, KEY_TAB);
    assert_eq!(keystroke_for_char(' ').expect("space").keycode, KEY_SPACE);
}

#[test]
fn the_printable_ascii_set_is_fully_mapped() {
    for b in 0x20u8..=0x7e {
        let c = b as char;
        assert!(
            keystroke_for_char(c).is_some(),
            "printable ASCII {c:?} must have a keystroke"
        );
    }
}

#[test]
fn non_ascii_is_unmapped() {
    assert!(keystroke_for_char('é').is_none());
    assert!(keystroke_for_char('\r').is_none());
    assert!(keystroke_for_char('—').is_none());
}
