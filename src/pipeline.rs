//! This module implements the Caesar cipher as a composition of Turing Machine runs.
//!
//! All arithmetic happens in unary marks on automaton tapes: letters are recoded to marks,
//! added, reduced mod 26 by repeated subtraction and recoded back. The host only formats
//! stage inputs, filters stage outputs and drives the bounded mod-26 loop.

use crate::config::PipelineConfig;
use crate::definition::MachineDefinition;
use crate::library::MachineLibrary;
use crate::machine::TuringMachine;
use crate::parser::{parse_input, Key};
use crate::trace::Trace;
use crate::types::{
    tape_excerpt, Context, MachineError, Outcome, Stage, TraceMode, ALPHABET_SIZE,
};
use crate::unary::{count_marks, extract_marks, first_letter, marks};

/// The five machines a pipeline is composed from, one per `Stage`.
#[derive(Debug, Clone, Copy)]
pub struct MachineSet<'a> {
    pub letter_to_marks: &'a MachineDefinition,
    pub marks_to_letter: &'a MachineDefinition,
    pub numeral_to_letter: &'a MachineDefinition,
    pub add: &'a MachineDefinition,
    pub subtract: &'a MachineDefinition,
}

impl MachineSet<'static> {
    /// The machines of the embedded library.
    pub fn standard() -> Result<Self, MachineError> {
        Ok(Self {
            letter_to_marks: MachineLibrary::get(Stage::LetterToMarks.program())?,
            marks_to_letter: MachineLibrary::get(Stage::MarksToLetter.program())?,
            numeral_to_letter: MachineLibrary::get(Stage::NumeralToLetter.program())?,
            add: MachineLibrary::get(Stage::Add.program())?,
            subtract: MachineLibrary::get(Stage::Subtract.program())?,
        })
    }
}

impl<'a> MachineSet<'a> {
    /// The machine a stage runs.
    pub fn get(&self, stage: Stage) -> &'a MachineDefinition {
        match stage {
            Stage::LetterToMarks => self.letter_to_marks,
            Stage::MarksToLetter => self.marks_to_letter,
            Stage::NumeralToLetter => self.numeral_to_letter,
            Stage::Add => self.add,
            Stage::Subtract => self.subtract,
        }
    }
}

/// The result of a full `key#message` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// The encrypted or decrypted message.
    pub output: String,
    /// One trace per machine run, in execution order. Empty unless recording was requested.
    pub traces: Vec<Trace>,
}

/// Composes machine runs into letter recoding, unary arithmetic and the Caesar cipher.
///
/// A pipeline only holds shared references to immutable definitions, so one instance can
/// serve any number of threads. Every stage creates its own `TuringMachine`.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    machines: MachineSet<'a>,
    config: PipelineConfig,
}

impl Pipeline<'static> {
    /// A pipeline over the embedded machines with default limits.
    pub fn standard() -> Result<Self, MachineError> {
        Ok(Self::new(MachineSet::standard()?, PipelineConfig::default()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cipher {
    Encrypt,
    Decrypt,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline over `machines` with the given limits.
    pub fn new(machines: MachineSet<'a>, config: PipelineConfig) -> Self {
        Self { machines, config }
    }

    /// Replaces the limits of this pipeline.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the limits applied to every run.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the machines this pipeline runs.
    pub fn machines(&self) -> &MachineSet<'a> {
        &self.machines
    }

    /// Recodes an uppercase letter to its alphabet index in marks (`A` is zero marks).
    pub fn letter_to_marks(&self, letter: char) -> Result<String, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).letter_to_marks(letter)
    }

    /// Recodes marks to a letter. Values past 25 saturate at `Z`.
    ///
    /// The machine always runs first and its errors are returned as is; only an accepted
    /// run that leaves no letter for an input without marks falls back to `A`.
    pub fn marks_to_letter(&self, marks: &str) -> Result<char, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).marks_to_letter(marks)
    }

    /// Adds two values given in marks.
    pub fn add(&self, a: &str, b: &str) -> Result<String, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).add(a, b)
    }

    /// Fails with an execution error naming the subtract stage when `a < b`.
    pub fn subtract(&self, a: &str, b: &str) -> Result<String, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).subtract(a, b)
    }

    /// Reduces marks modulo 26 by repeated subtraction.
    ///
    /// If `mod26_max_iterations` subtractions are not enough, the partial result is
    /// returned as is.
    pub fn mod26(&self, marks: &str) -> Result<String, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).mod26(marks)
    }

    /// The shift a key denotes, in marks.
    pub fn key_to_marks(&self, key: &Key) -> Result<String, MachineError> {
        self.session(TraceMode::Off, Context::Key).key_to_marks(key)
    }

    /// Shifts one character forward by `shift_marks`.
    ///
    /// Characters other than ASCII letters pass through unchanged; case is preserved.
    pub fn encrypt_letter(&self, letter: char, shift_marks: &str) -> Result<char, MachineError> {
        self.session(TraceMode::Off, Context::Standalone).shift_letter(letter, shift_marks)
    }

    /// Shifts one character back by `shift_marks`, by adding `26 - shift` instead.
    pub fn decrypt_letter(&self, letter: char, shift_marks: &str) -> Result<char, MachineError> {
        let mut session = self.session(TraceMode::Off, Context::Standalone);
        let inverse = session.inverse(shift_marks)?;
        session.shift_letter(letter, &inverse)
    }

    /// Encrypts `text` with a key given as a letter or a numeral 1-27.
    pub fn encrypt(&self, key: &str, text: &str) -> Result<String, MachineError> {
        let key = Key::parse(key)?;
        self.session(TraceMode::Off, Context::Key)
            .transform(&key, text, Cipher::Encrypt)
    }

    /// Decrypts `text` with a key given as a letter or a numeral 1-27.
    pub fn decrypt(&self, key: &str, text: &str) -> Result<String, MachineError> {
        let key = Key::parse(key)?;
        self.session(TraceMode::Off, Context::Key)
            .transform(&key, text, Cipher::Decrypt)
    }

    /// Encrypts a `key#message` input, optionally recording every machine run.
    pub fn encrypt_input(
        &self,
        input: &str,
        mode: TraceMode,
    ) -> Result<PipelineResult, MachineError> {
        self.process(input, mode, Cipher::Encrypt)
    }

    /// Decrypts a `key#message` input, optionally recording every machine run.
    pub fn decrypt_input(
        &self,
        input: &str,
        mode: TraceMode,
    ) -> Result<PipelineResult, MachineError> {
        self.process(input, mode, Cipher::Decrypt)
    }

    fn process(
        &self,
        input: &str,
        mode: TraceMode,
        cipher: Cipher,
    ) -> Result<PipelineResult, MachineError> {
        let input = parse_input(input)?;
        let mut session = self.session(mode, Context::Key);
        let output = session.transform(&input.key, &input.message, cipher)?;

        Ok(PipelineResult {
            output,
            traces: session.traces,
        })
    }

    fn session(&self, mode: TraceMode, context: Context) -> Session<'_, 'a> {
        Session {
            pipeline: self,
            mode,
            traces: Vec::new(),
            context,
        }
    }
}

/// State of one driver invocation: the trace mode, the traces collected so far and the
/// context stages currently run in.
struct Session<'p, 'a> {
    pipeline: &'p Pipeline<'a>,
    mode: TraceMode,
    traces: Vec<Trace>,
    context: Context,
}

impl Session<'_, '_> {
    fn transform(&mut self, key: &Key, text: &str, cipher: Cipher) -> Result<String, MachineError> {
        self.context = Context::Key;
        let shift = self.key_to_marks(key)?;
        let shift = match cipher {
            Cipher::Encrypt => shift,
            Cipher::Decrypt => self.inverse(&shift)?,
        };

        log::debug!(
            "{:?} with key {} ({} marks), {} characters",
            cipher,
            key,
            count_marks(&shift),
            text.chars().count()
        );

        let mut output = String::with_capacity(text.len());
        for (i, c) in text.chars().enumerate() {
            self.context = Context::Char(i);
            output.push(self.shift_letter(c, &shift)?);
        }

        Ok(output)
    }

    fn shift_letter(&mut self, letter: char, shift: &str) -> Result<char, MachineError> {
        if !letter.is_ascii_alphabetic() {
            return Ok(letter);
        }

        let value = self.letter_to_marks(letter.to_ascii_uppercase())?;
        let sum = self.add(&value, shift)?;
        let reduced = self.mod26(&sum)?;
        let shifted = self.marks_to_letter(&reduced)?;

        Ok(if letter.is_ascii_lowercase() {
            shifted.to_ascii_lowercase()
        } else {
            shifted
        })
    }

    /// `26 - shift` marks.
    fn inverse(&mut self, shift: &str) -> Result<String, MachineError> {
        self.subtract(&marks(ALPHABET_SIZE), shift)
    }

    fn key_to_marks(&mut self, key: &Key) -> Result<String, MachineError> {
        let marks = match key {
            Key::Letter(letter) => self.letter_to_marks(*letter)?,
            Key::Numeral(n) => {
                let output = self.run(Stage::NumeralToLetter, &n.to_string())?;
                let letter = self.letter_in(Stage::NumeralToLetter, output)?;
                self.letter_to_marks(letter)?
            }
        };
        Ok(marks)
    }

    fn letter_to_marks(&mut self, letter: char) -> Result<String, MachineError> {
        let output = self.run(Stage::LetterToMarks, &letter.to_string())?;
        Ok(extract_marks(&output))
    }

    fn marks_to_letter(&mut self, marks: &str) -> Result<char, MachineError> {
        let output = self.run(Stage::MarksToLetter, marks)?;

        // A blank input is the zero value.
        if first_letter(&output).is_none() && count_marks(marks) == 0 {
            return Ok('A');
        }
        self.letter_in(Stage::MarksToLetter, output)
    }

    fn add(&mut self, a: &str, b: &str) -> Result<String, MachineError> {
        let output = self.run(Stage::Add, &format!("{a}+{b}"))?;
        Ok(extract_marks(&output))
    }

    fn subtract(&mut self, a: &str, b: &str) -> Result<String, MachineError> {
        let output = self.run(Stage::Subtract, &format!("{a}-{b}"))?;
        Ok(extract_marks(&output))
    }

    fn mod26(&mut self, value: &str) -> Result<String, MachineError> {
        let modulus = marks(ALPHABET_SIZE);
        let ceiling = self.pipeline.config.mod26_max_iterations;
        let mut current = extract_marks(value);

        for _ in 0..ceiling {
            if count_marks(&current) < ALPHABET_SIZE {
                return Ok(current);
            }
            current = self.subtract(&current, &modulus)?;
        }

        if count_marks(&current) >= ALPHABET_SIZE {
            log::warn!(
                "mod26 stopped after {} iterations with {} marks left",
                ceiling,
                count_marks(&current)
            );
        }
        Ok(current)
    }

    fn letter_in(&self, stage: Stage, output: String) -> Result<char, MachineError> {
        first_letter(&output).ok_or_else(|| MachineError::UnexpectedOutput {
            stage,
            context: self.context,
            output: tape_excerpt(&output),
        })
    }

    /// Runs one stage on a fresh machine and returns its tape if it accepted.
    fn run(&mut self, stage: Stage, input: &str) -> Result<String, MachineError> {
        let definition = self.pipeline.machines.get(stage);
        let mut machine = TuringMachine::new(definition);
        let execution = machine.execute(input, self.budget(stage, input), self.mode);

        log::trace!(
            "{} on {:?}: {} in {} steps",
            stage,
            input,
            execution.outcome,
            execution.steps
        );

        if let Some(mut trace) = execution.trace {
            trace.label = self.label(stage);
            self.traces.push(trace);
        }

        match execution.outcome {
            Outcome::Accepted => Ok(execution.output),
            outcome => Err(MachineError::Execution {
                stage,
                context: self.context,
                outcome,
                output: tape_excerpt(&execution.output),
            }),
        }
    }

    /// Step budget for one run of `stage` on `input`.
    ///
    /// The arithmetic machines sweep the tape once per mark they move or cancel and need up
    /// to about half the square of the input length. They get the square of the input
    /// length, or `max_steps` if that is larger.
    fn budget(&self, stage: Stage, input: &str) -> usize {
        let max_steps = self.pipeline.config.max_steps;

        match stage {
            Stage::Add | Stage::Subtract => {
                let cells = input.chars().count().saturating_add(2);
                max_steps.max(cells.saturating_mul(cells))
            }
            Stage::LetterToMarks | Stage::MarksToLetter | Stage::NumeralToLetter => max_steps,
        }
    }

    fn label(&self, stage: Stage) -> String {
        match self.context {
            Context::Standalone => stage.to_string(),
            Context::Key => format!("key: {stage}"),
            Context::Char(i) => format!("[{i}] {stage}"),
        }
    }
}
