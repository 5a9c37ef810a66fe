//! Estimates how tall a lyric block renders.
//!
//! Text is word-wrapped with `textwrap`, which counts display columns (CJK
//! glyphs take two). One column is half an em wide, so a line fits
//! `inner_width / (font_size * 0.5)` columns.

/// Horizontal padding between the window edge and the text block.
const HORIZONTAL_PADDING: u32 = 48;
/// Vertical padding around the text block.
const VERTICAL_PADDING: f64 = 16.0;
const MAIN_LINE_HEIGHT: f64 = 1.2;
const SUB_LINE_HEIGHT: f64 = 1.3;
const SUB_FONT_RATIO: f64 = 0.55;
const SUB_FONT_MIN: f64 = 14.0;
/// Gap between the main and sub text blocks.
const SUB_GAP: f64 = 6.0;
const COLUMN_EM: f64 = 0.5;

/// Font size of the secondary line for a given main font size.
pub fn sub_font_size(font_size: u32) -> f64 {
    (font_size as f64 * SUB_FONT_RATIO).max(SUB_FONT_MIN)
}

/// Number of rows `text` occupies at `font_size` within `inner_width` px.
fn rows(text: &str, font_size: f64, inner_width: u32) -> usize {
    let column = (font_size * COLUMN_EM).max(1.0);
    let columns = ((inner_width as f64 / column).floor() as usize).max(1);
    textwrap::wrap(text, columns).len().max(1)
}

/// Rendered height in pixels of a main/sub lyric pair.
pub fn measure_content_height(main: &str, sub: &str, font_size: u32, window_width: u32) -> u32 {
    let inner = window_width.saturating_sub(HORIZONTAL_PADDING).max(1);
    let main_font = font_size as f64;

    let mut height = VERTICAL_PADDING + rows(main, main_font, inner) as f64 * main_font * MAIN_LINE_HEIGHT;

    if !sub.is_empty() {
        let sub_font = sub_font_size(font_size);
        height += SUB_GAP + rows(sub, sub_font, inner) as f64 * sub_font * SUB_LINE_HEIGHT;
    }

    height.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_height() {
        // 16 + 48 * 1.2
        assert_eq!(measure_content_height("Hello", "", 48, 800), 74);
    }

    #[test]
    fn sub_text_adds_its_own_block() {
        let main_only = measure_content_height("Hello", "", 48, 800);
        let with_sub = measure_content_height("Hello", "Hallo", 48, 800);
        // 73.6 -> 74 alone; 73.6 + 6 + 26.4 * 1.3 = 113.92 -> 114 with sub.
        assert_eq!(with_sub - main_only, 40);
    }

    #[test]
    fn sub_font_has_a_minimum() {
        assert_eq!(sub_font_size(10), 14.0);
        assert_eq!(sub_font_size(100), 55.0);
    }

    #[test]
    fn long_lines_wrap_into_more_rows() {
        let short = measure_content_height("one two", "", 48, 400);
        let long = measure_content_height(
            "a considerably longer lyric line that cannot fit in one row",
            "",
            48,
            400,
        );
        assert!(long > short);
        // 352 px inner width / 24 px columns = 14 columns.
        let rows = textwrap::wrap("a considerably longer lyric line that cannot fit in one row", 14).len();
        assert_eq!(long, (16.0 + rows as f64 * 57.6).ceil() as u32);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        // 14 columns fit 7 CJK glyphs per row.
        let text = "一二三四五六七八九十";
        let expected = (16.0 + 2.0 * 57.6_f64).ceil() as u32;
        assert_eq!(measure_content_height(text, "", 48, 400), expected);
    }

    #[test]
    fn explicit_newlines_count_as_rows() {
        let one = measure_content_height("x", "line", 48, 800);
        let two = measure_content_height("x", "line\nline", 48, 800);
        assert!(two > one);
    }

    #[test]
    fn tiny_window_does_not_panic() {
        assert!(measure_content_height("text", "sub", 48, 0) > 0);
    }
}
