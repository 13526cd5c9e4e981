//! Plain-text math rendering for the terminal.
//!
//! Removes the math delimiters and turns the handful of TeX spacing and text
//! commands that show up in quiz units into readable text.

use quiz_core::{MathOptions, MathRenderError, MathRenderer};
use regex::Regex;
use std::sync::LazyLock;

static TEXT_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:mathrm|text|mathit|operatorname)\{([^{}]*)\}").expect("text command pattern")
});
static SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[,;:! ]|\\q?quad").expect("spacing pattern"));

pub struct TerminalMath;

impl MathRenderer for TerminalMath {
    fn render(&self, html: &mut String, options: &MathOptions) -> Result<(), MathRenderError> {
        let mut out = String::with_capacity(html.len());
        let mut rest = html.as_str();

        'scan: while !rest.is_empty() {
            for delimiter in &options.delimiters {
                let Some(after_left) = rest.strip_prefix(delimiter.left) else {
                    continue;
                };
                match after_left.find(delimiter.right) {
                    Some(end) => {
                        out.push_str(&plain_tex(&after_left[..end]));
                        rest = &after_left[end + delimiter.right.len()..];
                        continue 'scan;
                    }
                    None if options.throw_on_error => {
                        return Err(MathRenderError(format!(
                            "unclosed {} delimiter",
                            delimiter.left
                        )));
                    }
                    None => {}
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }

        *html = out;
        Ok(())
    }
}

fn plain_tex(tex: &str) -> String {
    let tex = TEXT_COMMAND.replace_all(tex, "$1");
    let tex = SPACING.replace_all(&tex, " ");
    tex.trim().to_string()
}
