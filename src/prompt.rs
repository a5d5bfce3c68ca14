//! Interactive questions for images without usable metadata.
//!
//! The resolver never touches stdin directly. It asks a [`Console`] for one
//! line at a time, and the two question helpers here own the retry policy:
//!
//! | Question | Empty answer | Invalid answer |
//! |---|---|---|
//! | [`ask_focal_length`] | skip the image | ask again, forever |
//! | [`ask_sensor_class`] | full-frame | full-frame |
//!
//! End of input (stdin closed, script exhausted) counts as an empty answer,
//! so a piped run skips the rest instead of spinning.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented question/answer channel.
pub trait Console {
    /// Show `prompt` and read one line, without its trailing newline.
    /// `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show an informational line.
    fn say(&mut self, line: &str) -> io::Result<()>;
}

/// Console over the process's stdin and stdout.
pub struct StdConsole<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl StdConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Console for StdConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }
}

/// Console fed from a fixed list of answers, for scripted runs and tests.
/// Records everything shown.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    /// Prompts and informational lines, in the order they were shown.
    pub transcript: Vec<String>,
    /// How many times `read_line` was called.
    pub questions_asked: usize,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
            questions_asked: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.questions_asked += 1;
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        self.transcript.push(line.to_string());
        Ok(())
    }
}

/// Answer to the focal length question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocalAnswer {
    Millimetres(f64),
    Skip,
}

const FOCAL_PROMPT: &str = "Focal length (mm): ";

/// Ask for a focal length until the answer is a number or empty.
pub fn ask_focal_length(console: &mut dyn Console) -> io::Result<FocalAnswer> {
    loop {
        let Some(line) = console.read_line(FOCAL_PROMPT)? else {
            return Ok(FocalAnswer::Skip);
        };
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(FocalAnswer::Skip);
        }
        match answer.parse::<f64>() {
            Ok(mm) if mm.is_finite() => return Ok(FocalAnswer::Millimetres(mm)),
            _ => console.say("Please enter a number, or press Enter to skip this image")?,
        }
    }
}

/// Sensor size categories offered when metadata is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorClass {
    FullFrame,
    ApsC,
    CanonApsC,
    MicroFourThirds,
    OneInch,
}

impl SensorClass {
    pub const ALL: [SensorClass; 5] = [
        SensorClass::FullFrame,
        SensorClass::ApsC,
        SensorClass::CanonApsC,
        SensorClass::MicroFourThirds,
        SensorClass::OneInch,
    ];

    /// The menu key for this class.
    pub fn code(self) -> char {
        match self {
            SensorClass::FullFrame => '1',
            SensorClass::ApsC => '2',
            SensorClass::CanonApsC => '3',
            SensorClass::MicroFourThirds => '4',
            SensorClass::OneInch => '5',
        }
    }

    pub fn crop_factor(self) -> f64 {
        match self {
            SensorClass::FullFrame => 1.0,
            SensorClass::ApsC => 1.5,
            SensorClass::CanonApsC => 1.6,
            SensorClass::MicroFourThirds => 2.0,
            SensorClass::OneInch => 2.7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SensorClass::FullFrame => "Full frame",
            SensorClass::ApsC => "APS-C",
            SensorClass::CanonApsC => "Canon APS-C",
            SensorClass::MicroFourThirds => "Micro Four Thirds",
            SensorClass::OneInch => "1-inch",
        }
    }

    /// Parse a menu answer; anything unrecognized (including empty) is full-frame.
    pub fn from_choice(choice: &str) -> Self {
        let mut chars = choice.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::ALL
                .into_iter()
                .find(|s| s.code() == c)
                .unwrap_or(SensorClass::FullFrame),
            _ => SensorClass::FullFrame,
        }
    }
}

/// Answer to the sensor question: the parsed class and what was typed.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorAnswer {
    pub class: SensorClass,
    pub raw_choice: String,
}

/// Show the sensor menu and read one answer. Never re-asks.
pub fn ask_sensor_class(console: &mut dyn Console) -> io::Result<SensorAnswer> {
    console.say("Sensor size:")?;
    for class in SensorClass::ALL {
        console.say(&format!(
            "  {}. {} (crop factor {:.1})",
            class.code(),
            class.label(),
            class.crop_factor()
        ))?;
    }
    let raw_choice = console
        .read_line("Choose 1-5 [1]: ")?
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    Ok(SensorAnswer {
        class: SensorClass::from_choice(&raw_choice),
        raw_choice,
    })
}
