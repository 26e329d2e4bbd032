//! Record encoding
//!
//! This module assembles the prompt and answer strings of a training record.
//! The prompt wraps the window and daily samples in a fixed instruction
//! frame; the answer carries the summary, anomalies, narrative and meal
//! recommendations as compact JSON.

use crate::error::GenerateError;
use crate::types::{
    AnomalyRecord, Commentary, DailySample, GeneratedRecord, ObservationWindow, RecordInput,
    RecordOutput, SummaryStats,
};

/// Prefix of every prompt
pub const PROMPT_HEADER: &str = "### 질문:\n";

/// Instruction block closing every prompt
pub const PROMPT_INSTRUCTION: &str =
    "\n### 지시사항:\nwsum, anom, cmt.g(평균 대비 %), fd 생성\n### 답변:\n";

/// Encoder for prompt / answer record pairs
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordEncoder;

impl RecordEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Build the typed prompt and answer payloads for one record
    pub fn assemble(
        &self,
        window: &ObservationWindow,
        samples: Vec<DailySample>,
        summary: SummaryStats,
        anomalies: Vec<AnomalyRecord>,
        narrative: String,
        meals: Vec<String>,
    ) -> (RecordInput, RecordOutput) {
        let input = RecordInput {
            ws: window.start,
            we: window.end,
            dm: samples,
        };
        let output = RecordOutput {
            wsum: summary,
            anom: anomalies,
            cmt: Commentary { g: narrative },
            fd: meals,
        };
        (input, output)
    }

    /// Encode typed payloads into the record string pair
    pub fn encode(
        &self,
        input: &RecordInput,
        output: &RecordOutput,
    ) -> Result<GeneratedRecord, GenerateError> {
        Ok(GeneratedRecord {
            input: self.encode_prompt(input)?,
            output: self.encode_answer(output)?,
        })
    }

    /// Prompt text: header, compact input JSON, instruction block
    pub fn encode_prompt(&self, input: &RecordInput) -> Result<String, GenerateError> {
        let json = serde_json::to_string(input)?;
        Ok(format!("{PROMPT_HEADER}{json}{PROMPT_INSTRUCTION}"))
    }

    /// Answer text: compact output JSON
    pub fn encode_answer(&self, output: &RecordOutput) -> Result<String, GenerateError> {
        serde_json::to_string(output).map_err(GenerateError::JsonError)
    }

    /// One line of the JSONL stream, without the trailing newline
    pub fn to_json_line(&self, record: &GeneratedRecord) -> Result<String, GenerateError> {
        serde_json::to_string(record).map_err(GenerateError::JsonError)
    }
}
