use crate::font::resource::FontResource;

/// Continuation-line prefix; its width counts toward wrapped lines.
const INDENT: &str = "  ";

/// Greedy word-wrap against a pixel width budget.
///
/// Breaks at space/hyphen boundaries; when a token overflows with no boundary
/// available the break happens mid-token. A hyphen stays at the end of its
/// line, a breaking space is dropped. Strings already within budget return
/// unchanged.
pub fn auto_width(s: &str, font: &FontResource, px: f32, width: f32) -> String {
    wrap_with(s, |ch| font.advance(ch, px), width)
}

/// Wrap with an arbitrary per-character width measure (testing seam).
pub fn wrap_with(s: &str, measure: impl Fn(char) -> f32, width: f32) -> String {
    let total: f32 = s.chars().map(&measure).sum();
    if total <= width {
        return s.to_owned();
    }

    let indent_width: f32 = INDENT.chars().map(&measure).sum();
    let mut lines: Vec<String> = Vec::new();
    let mut cur_chars: Vec<char> = Vec::new();
    let mut cur_widths: Vec<f32> = Vec::new();
    // Running width of the current line, including its indent once wrapped.
    let mut cur = 0.0_f32;

    for ch in s.chars() {
        let cw = measure(ch);
        let overflow = cur + cw > width;
        if (ch == ' ' || ch == '-') && overflow {
            if ch == '-' {
                cur_chars.push('-');
            }
            lines.push(cur_chars.drain(..).collect());
            cur_widths.clear();
            cur = indent_width;
        } else if overflow {
            if let Some(bp) = cur_chars.iter().rposition(|&c| c == ' ' || c == '-') {
                // Break retroactively at the last boundary: the tail after it
                // flows onto the continuation line.
                let tail: Vec<char> = cur_chars.split_off(bp + 1);
                let tail_widths: Vec<f32> = cur_widths.split_off(bp + 1);
                if cur_chars.last() == Some(&' ') {
                    cur_chars.pop();
                    cur_widths.pop();
                }
                lines.push(cur_chars.drain(..).collect());
                cur_chars = tail;
                cur_widths = tail_widths;
                cur = indent_width + cur_widths.iter().sum::<f32>();
            } else {
                // No boundary in this line: break mid-token.
                lines.push(cur_chars.drain(..).collect());
                cur_widths.clear();
                cur = indent_width;
            }
            cur_chars.push(ch);
            cur_widths.push(cw);
            cur += cw;
        } else {
            cur_chars.push(ch);
            cur_widths.push(cw);
            cur += cw;
        }
    }
    lines.push(cur_chars.into_iter().collect());

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(INDENT);
        }
        out.push_str(line);
    }
    out
}
