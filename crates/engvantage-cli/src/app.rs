//! Interactive terminal loop.
//!
//! Purely presentational: renders the controller's state and translates
//! typed commands into controller operations. Gateway completions are
//! drained between commands; failures surface as inline messages, never as
//! process exits.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{Cell, Table};

use engvantage_core::model::{QuizQuestion, StudentLevel, TargetLanguage};
use engvantage_core::session::SessionController;

pub async fn run(ctrl: &mut SessionController) -> Result<()> {
    println!("engvantage — AI-powered vocabulary trainer");
    println!(
        "Level: {} | Language: {} (type 'help' for commands)",
        ctrl.level(),
        ctrl.target_language()
    );

    ctrl.reload_words();
    ctrl.settle().await;
    render_after_fetch(ctrl);

    loop {
        let line = input(">> ")?;
        let line = line.trim();
        let mut parts = line.split_ascii_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let rest = parts.collect::<Vec<&str>>().join(" ");

        match command {
            "quit" | "exit" | "q" => break,
            "help" => print_help(),
            "refresh" => {
                ctrl.reload_words();
                ctrl.settle().await;
                render_after_fetch(ctrl);
            }
            "level" => match rest.parse::<StudentLevel>() {
                Ok(level) => {
                    ctrl.set_level(level);
                    ctrl.settle().await;
                    render_after_fetch(ctrl);
                }
                Err(e) => println!("{e} (try: junior, senior, toeic)"),
            },
            "lang" => match rest.parse::<TargetLanguage>() {
                Ok(lang) => {
                    ctrl.set_target_language(lang);
                    ctrl.settle().await;
                    render_after_fetch(ctrl);
                }
                Err(e) => println!("{e} (try: zh-tw, zh-cn, ja, ko)"),
            },
            "learn" => match parse_index(&rest, ctrl.words().len()) {
                Some(i) => {
                    let word = &ctrl.words()[i];
                    let (id, surface, was_learned) = (word.id, word.word.clone(), word.learned);
                    ctrl.toggle_learned(id);
                    if was_learned {
                        println!("'{surface}' unmarked.");
                    } else {
                        println!("'{surface}' marked learned. Total: {}", ctrl.stats().total_words_learned);
                    }
                }
                None => println!("usage: learn <word number>"),
            },
            "show" => match parse_index(&rest, ctrl.words().len()) {
                Some(i) => render_word_card(ctrl, i),
                None => println!("usage: show <word number>"),
            },
            "say" => match parse_index(&rest, ctrl.words().len()) {
                Some(i) => {
                    let surface = ctrl.words()[i].word.clone();
                    ctrl.pronounce(&surface);
                    println!("Playing '{surface}'…");
                }
                None => println!("usage: say <word number>"),
            },
            "quiz" => {
                ctrl.start_quiz();
                ctrl.settle().await;
                if let Some(reason) = ctrl.quiz_load().failure() {
                    println!("Could not build a quiz: {reason}");
                } else if ctrl.in_quiz_mode() {
                    run_quiz(ctrl)?;
                }
            }
            "stats" => render_stats(ctrl),
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }

        ctrl.drain_pending();
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  learn <n>   toggle the learned flag on word n");
    println!("  show <n>    full card for word n (example sentence etc.)");
    println!("  say <n>     pronounce word n");
    println!("  quiz        quiz over the current list");
    println!("  level <l>   switch level (junior | senior | toeic)");
    println!("  lang <l>    switch translation language (zh-tw | zh-cn | ja | ko)");
    println!("  refresh     fetch a fresh word list");
    println!("  stats       show progress");
    println!("  quit        leave");
}

/// Parse a 1-based word index.
fn parse_index(arg: &str, len: usize) -> Option<usize> {
    let n: usize = arg.trim().parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

fn render_after_fetch(ctrl: &SessionController) {
    if let Some(reason) = ctrl.words_load().failure() {
        println!("Could not load words: {reason}");
        if !ctrl.words().is_empty() {
            println!("Keeping the previous list.");
        }
        return;
    }
    render_words(ctrl);
}

fn render_words(ctrl: &SessionController) {
    if ctrl.words().is_empty() {
        println!("No words loaded. Try 'refresh'.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Word", "Phonetic", "Definition", "Translation", "Learned"]);
    for (i, word) in ctrl.words().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&word.word),
            Cell::new(&word.phonetic),
            Cell::new(&word.definition),
            Cell::new(&word.translation),
            Cell::new(if word.learned { "✓" } else { "" }),
        ]);
    }
    println!("{table}");
}

fn render_word_card(ctrl: &SessionController, index: usize) {
    let word = &ctrl.words()[index];
    println!("{} {}", word.word, word.phonetic);
    println!("  {} — {}", word.definition, word.translation);
    println!("  {}", word.example_sentence);
    println!("  {}", word.example_translation);
}

fn render_stats(ctrl: &SessionController) {
    let stats = ctrl.stats();
    println!("Words learned: {}", stats.total_words_learned);
    println!("Current streak: {} day(s)", stats.current_streak);
    if stats.last_study_date.is_empty() {
        println!("Last studied: never");
    } else {
        println!("Last studied: {}", stats.last_study_date);
    }
    println!("Level: {} | Language: {}", stats.level, stats.target_language);
}

/// Present the quiz, grade locally, and report the score back.
fn run_quiz(ctrl: &mut SessionController) -> Result<()> {
    let questions: Vec<QuizQuestion> = ctrl.quiz().unwrap_or_default().to_vec();
    let total = questions.len();
    println!("Quiz time! {total} questions. Answer 1-4, or 'q' to stop.");

    let mut score = 0usize;
    for (i, question) in questions.iter().enumerate() {
        println!();
        println!("{}/{total}: {}", i + 1, question.question);
        for (j, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", j + 1);
        }

        let answer = loop {
            let line = input("answer> ")?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                ctrl.cancel_quiz();
                println!("Quiz cancelled.");
                return Ok(());
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                _ => println!("Enter 1-{} or 'q'.", question.options.len()),
            }
        };

        if question.correct_index() == Some(answer) {
            score += 1;
            println!("Correct!");
        } else {
            println!("Not quite — the answer was '{}'.", question.correct_answer);
        }
    }

    if let Some(outcome) = ctrl.complete_quiz(score) {
        println!();
        println!("Quiz complete! You scored {} out of {}.", outcome.score, outcome.total);
    }
    Ok(())
}

/// Prompted line read. EOF reads as 'quit' so piped input ends cleanly.
fn input(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok("quit".to_string());
    }
    Ok(line)
}
