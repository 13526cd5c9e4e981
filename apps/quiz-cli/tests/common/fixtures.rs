//! Quiz markup fixtures.

/// A multiple-choice card with `count` options, the correct one at `correct`.
pub fn mcq_card(prompt: &str, count: usize, correct: usize) -> String {
    let choices: String = (0..count)
        .map(|i| format!(r#"<button class="choice" data-i="{i}">Option {}</button>"#, i + 1))
        .collect();
    format!(
        r#"<div class="card quiz-mcq">
  <p>{prompt}</p>
  <div class="choices" data-correct="{correct}">{choices}</div>
  <button data-action="check">Check</button>
  <button data-action="show">Show solution</button>
  <button data-action="reset">Reset</button>
  <div class="feedback"></div>
  <div class="solution-show">Option {} is right.</div>
</div>"#,
        correct + 1
    )
}

/// A numeric card with the given answer and tolerance, units in m/s.
pub fn numeric_card(prompt: &str, answer: &str, tol: &str) -> String {
    format!(
        r#"<div class="card quiz-num" data-answer="{answer}" data-tol="{tol}"
  data-decimals="3" data-units="\,\mathrm{{m/s}}">
  <p>{prompt}</p>
  <input type="text">
  <button data-action="check">Check</button>
  <button data-action="reset">Reset</button>
  <div class="feedback"></div>
</div>"#
    )
}

/// A full HTML document wrapping `body`.
pub fn document(body: &str) -> String {
    format!("<!doctype html>\n<html><head><title>Quiz</title></head><body>\n{body}\n</body></html>")
}

/// A page holding one fetched deck.
pub fn deck_page(sources: &[&str]) -> String {
    document(&format!(
        r#"<h1>Practice</h1><div class="quiz-deck" data-src="{}"></div>"#,
        sources.join(",")
    ))
}
