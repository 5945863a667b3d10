use ghostwriter::layout::{KeyboardLayout, LayoutKind};
use ghostwriter::rng::RandomSource;

#[test]
fn neighbor_of_a_letter_is_a_different_letter() {
    let layout = KeyboardLayout::new(LayoutKind::UsQwerty);
    let mut rng = RandomSource::seeded(1);

    for _ in 0..200 {
        let n = layout.neighbor_key('a', &mut rng);
        assert!(n.is_ascii_lowercase());
        assert_ne!(n, 'a', "the key itself is never its own neighbor");
    }
}

#[test]
fn neighbor_preserves_case() {
    let layout = KeyboardLayout::new(LayoutKind::UsQwerty);
    let mut rng = RandomSource::seeded(2);

    for _ in 0..100 {
        assert!(layout.neighbor_key('a', &mut rng).is_lowercase());
        assert!(layout.neighbor_key('A', &mut rng).is_uppercase());
    }
}

#[test]
fn non_letters_are_returned_unchanged() {
    let layout = KeyboardLayout::new(LayoutKind::UsQwerty);
    let mut rng = RandomSource::seeded(3);

    for c in ['1', ' ', '!', '\n', '.', 'é'] {
        assert_eq!(layout.neighbor_key(c, &mut rng), c);
    }
}

#[test]
fn qwerty_neighbors_respect_row_geometry() {
    let layout = KeyboardLayout::new(LayoutKind::UsQwerty);
    let mut rng = RandomSource::seeded(4);

    // 'z' sits at the bottom-left corner: only a, s, x are adjacent.
    for _ in 0..200 {
        let n = layout.neighbor_key('z', &mut rng);
        assert!("asx".contains(n), "unexpected qwerty neighbor {n:?} for 'z'");
    }
}

#[test]
fn qwertz_moves_z_to_the_top_row() {
    let layout = KeyboardLayout::new(LayoutKind::Qwertz);
    let mut rng = RandomSource::seeded(5);

    // On QWERTZ 'z' is between t and u on the top row.
    for _ in 0..200 {
        let n = layout.neighbor_key('z', &mut rng);
        assert!(
            "tughj".contains(n),
            "unexpected qwertz neighbor {n:?} for 'z'"
        );
    }
}

#[test]
fn azerty_has_its_own_corner_geometry() {
    let layout = KeyboardLayout::new(LayoutKind::Azerty);
    let mut rng = RandomSource::seeded(6);

    // AZERTY top-left corner is 'a', flanked by z, q and s.
    for _ in 0..200 {
        let n = layout.neighbor_key('a', &mut rng);
        assert!("zqs".contains(n), "unexpected azerty neighbor {n:?} for 'a'");
    }
}

#[test]
fn uk_layout_shares_qwerty_letter_rows() {
    let us = KeyboardLayout::new(LayoutKind::UsQwerty);
    let uk = KeyboardLayout::new(LayoutKind::UkQwerty);
    let mut rng = RandomSource::seeded(7);

    for _ in 0..100 {
        let n = uk.neighbor_key('z', &mut rng);
        assert!("asx".contains(n));
        let n = us.neighbor_key('q', &mut rng);
        assert!("was".contains(n));
    }
}

#[test]
fn is_letter_matches_alphabetic() {
    assert!(KeyboardLayout::is_letter('a'));
    assert!(KeyboardLayout::is_letter('Z'));
    assert!(KeyboardLayout::is_letter('é'));
    assert!(!KeyboardLayout::is_letter('1'));
    assert!(!KeyboardLayout::is_letter(' '));
}
