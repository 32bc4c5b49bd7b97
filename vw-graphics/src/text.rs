//! Justification helpers shared by text drawing and measurement.

/// Share of `stretch` given to the `k`-th of `count` break characters.
///
/// The remainder goes one unit at a time to the leading breaks, so the shares
/// always sum to `stretch` (also for negative stretch).
pub(crate) fn stretch_share(stretch: i32, count: usize, k: usize) -> i32 {
    if count == 0 {
        return 0;
    }
    let n = count as i32;
    let base = stretch.div_euclid(n);
    let rem = stretch.rem_euclid(n) as usize;
    base + i32::from(k < rem)
}

/// Distribute `stretch` over the advances of the break characters in `text`.
///
/// Does nothing when `text` has no break character.
pub(crate) fn justify_advances(text: &str, advances: &mut [i32], break_char: char, stretch: i32) {
    if stretch == 0 {
        return;
    }
    let count = text.chars().filter(|&c| c == break_char).count();
    if count == 0 {
        return;
    }
    let mut k = 0;
    for (ch, adv) in text.chars().zip(advances.iter_mut()) {
        if ch == break_char {
            *adv += stretch_share(stretch, count, k);
            k += 1;
        }
    }
}

/// Width of the first `char_index` characters after justification.
pub(crate) fn leading_width(
    text: &str,
    advances: &[i32],
    char_index: usize,
    break_char: char,
    stretch: i32,
) -> i32 {
    let count = if stretch == 0 {
        0
    } else {
        text.chars().filter(|&c| c == break_char).count()
    };
    let mut width = 0;
    let mut k = 0;
    for (ch, adv) in text.chars().zip(advances).take(char_index) {
        width += adv;
        if count > 0 && ch == break_char {
            width += stretch_share(stretch, count, k);
            k += 1;
        }
    }
    width
}
