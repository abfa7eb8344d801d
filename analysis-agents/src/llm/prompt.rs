use analysis_core::MetricRecord;
use analysis_rag::ScoredChunk;

/// Response-format contract shared by every analysis prompt.
const FORMAT_INSTRUCTIONS: &str = "Respond with a single line in exactly this format:\n\
direction|confidence|reasoning\n\
where direction is one of bullish, bearish, neutral; confidence is a number \
between 0 and 1; reasoning is 2-3 sentences citing concrete figures.\n";

/// Formatter for LLM prompts over fundamentals and retrieved documents.
pub struct PromptFormatter;

impl PromptFormatter {
    /// Format a fundamentals record into an analysis prompt.
    pub fn fundamentals(record: &MetricRecord) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("═══ {} FUNDAMENTAL ANALYSIS ═══\n\n", record.ticker));
        prompt.push_str("REPORTED FUNDAMENTALS:\n");

        // Deterministic ordering keeps prompts reproducible across runs.
        let mut names: Vec<&String> = record.metrics.keys().collect();
        names.sort();
        for name in names {
            if let Some(value) = record.get(name) {
                prompt.push_str(&format!("  {}: {:.4}\n", name, value));
            }
        }
        if record.metrics.is_empty() {
            prompt.push_str("  (no fundamentals reported)\n");
        }

        prompt.push('\n');
        prompt.push_str("DECISION REQUIRED:\n");
        prompt.push_str(
            "Based on these fundamentals, is the stock bullish, bearish, or neutral?\n\n",
        );
        prompt.push_str(FORMAT_INSTRUCTIONS);

        prompt
    }

    /// Format one analytical query plus its retrieved context into a
    /// bounded-length insight request.
    pub fn document_insight(query: &str, context: &[ScoredChunk]) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("═══ DOCUMENT ANALYSIS: {} ═══\n\n", query));
        prompt.push_str(&format!(
            "Retrieved {} relevant excerpts (relevance {:.2}-{:.2}):\n\n",
            context.len(),
            context
                .iter()
                .map(|c| c.score)
                .fold(f32::INFINITY, f32::min),
            context.iter().map(|c| c.score).fold(0.0_f32, f32::max),
        ));

        for (i, scored) in context.iter().enumerate() {
            prompt.push_str(&format!(
                "{}. (chunk {}, relevance {:.2})\n{}\n\n",
                i + 1,
                scored.chunk.index,
                scored.score,
                scored.chunk.text.trim()
            ));
        }

        prompt.push_str(&format!(
            "In at most 3 sentences, summarize what these excerpts say about {}. \
Cite concrete figures where present.\n",
            query
        ));

        prompt
    }

    /// Format the synthesis prompt that turns per-query insights into one
    /// overall signal.
    pub fn document_overall(ticker: &str, insights: &[String]) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("═══ {} DOCUMENT SYNTHESIS ═══\n\n", ticker));

        if insights.is_empty() {
            prompt.push_str("No per-topic insights could be extracted from the document.\n\n");
        } else {
            prompt.push_str("INSIGHTS EXTRACTED FROM THE DOCUMENT:\n");
            for insight in insights {
                prompt.push_str(&format!("  - {}\n", insight));
            }
            prompt.push('\n');
        }

        prompt.push_str("DECISION REQUIRED:\n");
        prompt.push_str(
            "Weighing these insights together, is the overall picture bullish, bearish, \
or neutral?\n\n",
        );
        prompt.push_str(FORMAT_INSTRUCTIONS);

        prompt
    }
}
