//! Customer banking report: prompt construction and the text-generation
//! boundary.
//!
//! The generator is an external collaborator. Its failures never touch the
//! transaction data: `generate_report` always returns something to show,
//! falling back to a placeholder that carries the failure reason.

use crate::{
    config::ReportConfig,
    error::{SuiteError, SuiteResult},
    transactions::TransactionStats,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

const PLACEHOLDER_PREFIX: &str = "AI report generation failed";

/// Anything that turns a prompt into narrative text.
pub trait ReportGenerator {
    fn generate(&self, prompt: &str) -> SuiteResult<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerReport {
    pub customer_name: String,
    pub text: String,
    /// True when `text` is the failure placeholder rather than a report.
    pub placeholder: bool,
}

// ── Prompt ───────────────────────────────────────────────────────────────────

pub fn build_prompt(customer_name: &str, stats: &TransactionStats) -> String {
    let locations = stats
        .locations
        .iter()
        .map(|(loc, n)| format!("{loc}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Generate a structured banking analysis report for customer {customer_name} based on the following transaction data:

- Total Transactions: {total}
- Total Transaction Amount: ₹{total_amount}
- Average Transaction Amount: ₹{avg}
- Maximum Transaction Amount: ₹{max}
- Credit Transactions: {credit_count} totaling ₹{credit_sum}
- Debit Transactions: {debit_count} totaling ₹{debit_sum}
- Net Balance: ₹{net}
- Transaction Locations: {locations}

IMPORTANT FORMATTING RULES:
1. Use the ₹ symbol for all currency values
2. Always include spaces between numbers and words
3. Do NOT run words together
4. For example, write \"over the analyzed period\" NOT \"overtheanalyzedperiod\"
5. Write \"compared to 1 credit transaction of\" NOT \"comparedto1credittransactionof\"
6. Write \"The average transaction amount is\" NOT \"Theaverage...\"

Please organize your report in this exact format with numbering:

## Banking Analysis Report for {customer_name}

#### 1. Summary:
[Write summary here with proper spacing between numbers and words]

#### 2. Spending Habits & Financial Behavior:
[Write analysis here with proper spacing between numbers and words]

#### 3. Loan Recommendations:
[Write recommendations here with proper spacing between numbers and words]

#### 4. Notable Patterns:
[Write patterns here with proper spacing between numbers and words]
",
        total = stats.total_transactions,
        total_amount = stats.total_amount as i64,
        avg = stats.average_amount as i64,
        max = stats.max_transaction as i64,
        credit_count = stats.credit_count,
        credit_sum = stats.credit_sum as i64,
        debit_count = stats.debit_count,
        debit_sum = stats.debit_sum as i64,
        net = stats.net_balance as i64,
    )
}

// ── Post-processing ──────────────────────────────────────────────────────────

fn digit_letter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)([a-zA-Z])").expect("static regex"))
}

fn phrase_fixes() -> &'static [(Regex, &'static str)] {
    static FIXES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    FIXES.get_or_init(|| {
        [
            (r"(?i)over\s*the\s*analyzed\s*period", "over the analyzed period"),
            (r"(?i)The\s*average", "The average"),
            (r"(?i)compared\s*to", "compared to"),
            (r"(?i)resulting\s*in", "resulting in"),
            (r"(?i)indicates\s*a", "indicates a"),
            (r"(?i)with\s*an", "with an"),
            (r"(?i)of\s*₹", "of ₹"),
            (r"(?i)balance\s*of", "balance of"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).expect("static regex"), replacement))
        .collect()
    })
}

/// Repair words the model runs together: "5credit" → "5 credit", plus a
/// fixed list of phrases.
pub fn post_process(report: &str) -> String {
    let mut text = digit_letter().replace_all(report, "${1} ${2}").into_owned();
    for (re, replacement) in phrase_fixes() {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    text
}

// ── Generation ───────────────────────────────────────────────────────────────

pub fn generate_report(
    generator: &dyn ReportGenerator,
    customer_name: &str,
    stats: &TransactionStats,
) -> CustomerReport {
    let prompt = build_prompt(customer_name, stats);
    match generator.generate(&prompt) {
        Ok(text) => CustomerReport {
            customer_name: customer_name.to_string(),
            text: post_process(&text),
            placeholder: false,
        },
        Err(e) => {
            log::warn!("report: generation failed for {customer_name}: {e}");
            let reason = match e {
                SuiteError::Report(msg) => msg,
                other => other.to_string(),
            };
            CustomerReport {
                customer_name: customer_name.to_string(),
                text: format!("{PLACEHOLDER_PREFIX}: {reason}"),
                placeholder: true,
            }
        }
    }
}

// ── Gemini client ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Blocking client for the Generative Language `generateContent` endpoint.
/// One request, no retry.
pub struct GeminiReportGenerator {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiReportGenerator {
    /// Reads the API key from the configured environment variable.
    pub fn from_config(config: &ReportConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(api_key, config)
    }

    pub fn new(api_key: Option<String>, config: &ReportConfig) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl ReportGenerator for GeminiReportGenerator {
    fn generate(&self, prompt: &str) -> SuiteResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SuiteError::Report("API key not found. Please check your .env file.".into())
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SuiteError::Report(format!("network error: {e}")))?;

        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .map_err(|e| SuiteError::Report(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(SuiteError::Report(format!(
                "API error ({}): {message}",
                status.as_u16()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| SuiteError::Report(format!("failed to parse response: {e}")))?;

        let text = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SuiteError::Report("empty response".into()))?;

        Ok(text)
    }
}
