use std::io::{BufRead, Write};

use crate::config::{select_count, Fallback, RunConfig, Selection};
use crate::record::NameLinkRecord;
use crate::warn_time;

/// Answers the questions a run asks between stages.
pub trait Decide {
    /// Whether the freshly built index is good enough to go on with.
    fn confirm_index(&mut self, records: &[NameLinkRecord]) -> bool;
    /// How many index rows to scrape, out of `total`.
    fn count(&mut self, total: usize) -> Selection;
    fn run_link_check(&mut self) -> bool;
    /// How many images to download, out of `available`. `None` skips the pass.
    fn download_count(&mut self, available: usize) -> Option<usize>;
}

impl Decide for RunConfig {
    fn confirm_index(&mut self, _records: &[NameLinkRecord]) -> bool {
        self.confirm
    }

    fn count(&mut self, total: usize) -> Selection {
        match &self.count {
            Some(answer) => report_fallback(select_count(answer, total)),
            None => Selection::default_for(total),
        }
    }

    fn run_link_check(&mut self) -> bool {
        self.run_link_check
    }

    fn download_count(&mut self, available: usize) -> Option<usize> {
        let answer = self.download.as_ref()?;
        Some(report_fallback(select_count(answer, available)).count)
    }
}

fn report_fallback(selection: Selection) -> Selection {
    match selection.fallback {
        Some(Fallback::OutOfRange) => {
            warn_time!("Invalid count, using {} by default.", selection.count)
        }
        Some(Fallback::NotANumber) => {
            warn_time!("Not a number, using {} by default.", selection.count)
        }
        None => {}
    }
    selection
}

/// Asks on a console. Generic over the streams so it can be scripted.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question` and reads one line. `None` at end of input, or when
    /// the question can't be shown.
    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{question} ").and_then(|()| self.output.flush()) {
            warn_time!("Could not show prompt: {e}");
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> bool {
        self.ask(&format!("{question} [y/N]"))
            .is_some_and(|answer| is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "o" | "oui"
    )
}

impl<R: BufRead, W: Write> Decide for Prompter<R, W> {
    fn confirm_index(&mut self, records: &[NameLinkRecord]) -> bool {
        let preview: Vec<&str> = records.iter().take(5).map(|r| r.name.as_str()).collect();
        let shown = writeln!(
            self.output,
            "Built an index of {} entries ({}{}).",
            records.len(),
            preview.join(", "),
            if records.len() > preview.len() { ", ..." } else { "" }
        );
        if let Err(e) = shown {
            warn_time!("Could not show index preview: {e}");
            return false;
        }
        self.ask_yes_no("Is the generated index OK?")
    }

    fn count(&mut self, total: usize) -> Selection {
        match self.ask(&format!("How many Pokémon do you want to scrape? (1-{total})")) {
            Some(answer) => report_fallback(select_count(&answer, total)),
            None => Selection::default_for(total),
        }
    }

    fn run_link_check(&mut self) -> bool {
        self.ask_yes_no("Check that every saved link is reachable?")
    }

    fn download_count(&mut self, available: usize) -> Option<usize> {
        if !self.ask_yes_no("Download images?") {
            return None;
        }
        let answer = self.ask(&format!("How many images? (1-{available})"))?;
        Some(report_fallback(select_count(&answer, available)).count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn records(n: usize) -> Vec<NameLinkRecord> {
        (0..n)
            .map(|i| NameLinkRecord {
                name: format!("Mon{i}"),
                link: format!("https://pokemondb.net/pokedex/mon{i}"),
            })
            .collect()
    }

    #[test]
    fn scripted_session() {
        let input = Cursor::new("yes\n3\nn\nY\n2\n");
        let mut out = Vec::new();
        let mut prompter = Prompter::new(input, &mut out);

        assert!(prompter.confirm_index(&records(8)));
        assert_eq!(prompter.count(8).count, 3);
        assert!(!prompter.run_link_check());
        assert_eq!(prompter.download_count(3), Some(2));

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Built an index of 8 entries (Mon0, Mon1, Mon2, Mon3, Mon4, ...)."));
        assert!(shown.contains("How many Pokémon"));
    }

    #[test]
    fn bad_count_falls_back() {
        let mut prompter = Prompter::new(Cursor::new("many\n0\n"), Vec::new());
        assert_eq!(
            prompter.count(40),
            Selection { count: 10, fallback: Some(Fallback::NotANumber) }
        );
        assert_eq!(prompter.count(4).count, 4);
    }

    #[test]
    fn end_of_input_is_no() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
        assert!(!prompter.confirm_index(&records(2)));
        assert_eq!(prompter.count(2).count, 2);
        assert!(!prompter.run_link_check());
        assert_eq!(prompter.download_count(2), None);
    }

    struct ClosedOutput;

    impl Write for ClosedOutput {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unwritable_console_declines() {
        let input = Cursor::new("yes\n3\nyes\nyes\n2\n");
        let mut prompter = Prompter::new(input, ClosedOutput);
        assert!(!prompter.confirm_index(&records(3)));
        assert_eq!(prompter.count(8), Selection::default_for(8));
        assert!(!prompter.run_link_check());
        assert_eq!(prompter.download_count(3), None);
    }

    #[test]
    fn run_config_answers_directly() {
        let mut config = RunConfig {
            confirm: true,
            count: Some("1".into()),
            run_link_check: true,
            download: Some("99".into()),
        };
        assert!(config.confirm_index(&[]));
        assert_eq!(config.count(2).count, 1);
        assert!(config.run_link_check());
        assert_eq!(config.download_count(3), Some(3));

        assert_eq!(RunConfig::default().count(30).count, 10);
        assert_eq!(RunConfig::default().download_count(3), None);
    }

    #[test]
    fn yes_answers() {
        for yes in ["y", "YES", " oui ", "O"] {
            assert!(is_yes(yes));
        }
        for no in ["", "n", "nope", "yess"] {
            assert!(!is_yes(no));
        }
    }
}
