use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A tab is printed as this many spaces so it occupies the width it is
/// measured at.
const TAB_SPACES: &str = "    ";

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .enumerate()
        .map(|(i, part)| {
            let w = UnicodeWidthStr::width(part);
            if i > 0 { w + 4 } else { w }
        })
        .sum()
}

/// Fit a string into exactly `cells` terminal cells: cut at the last whole
/// grapheme that fits, then pad with spaces. Tabs are expanded. No ellipsis
/// is added, so columns stay aligned with the untruncated rows.
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = grapheme_display_width(grapheme);
        if width + gw > cells {
            break;
        }
        width += gw;
        if grapheme == "\t" {
            result.push_str(TAB_SPACES);
        } else {
            result.push_str(grapheme);
        }
    }
    result.extend(std::iter::repeat_n(' ', cells - width));
    result
}

fn grapheme_display_width(g: &str) -> usize {
    // Tab handling
    if g == "\t" {
        return 4;
    }
    UnicodeWidthStr::width(g)
}
