//! Narrative diagnosis: prompt construction and the bounded-retry call to
//! the text-generation collaborator.
//!
//! The returned text is always present — either the generated diagnosis or
//! a formatted error message embedding the failure detail. Callers never
//! branch on an absent diagnosis.

use std::time::Duration;

use super::inference::{is_quota_error, GeminiClient, GenerationClient, InferenceError};
use super::retry::{call_with_policy, RetryPolicy};
use crate::config::EngineConfig;
use crate::models::{Gas, GasReadings, Sample};

/// Hard cap on generation attempts.
pub const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff base: 10s after attempt 1, 20s after attempt 2.
const BACKOFF_BASE_SECS: u64 = 10;

/// The production retry policy: 3 attempts, linear backoff, and only
/// rate-limit/quota failures are worth retrying.
pub fn quota_retry_policy() -> RetryPolicy<InferenceError> {
    RetryPolicy::new(
        MAX_ATTEMPTS,
        |attempt| Duration::from_secs(BACKOFF_BASE_SECS * attempt as u64),
        is_quota_error,
    )
}

/// Fixed-structure analysis request over the nine gas readings.
/// Missing readings are sent as zero.
pub fn build_diagnosis_prompt(gases: &GasReadings, language: &str) -> String {
    let readings: Vec<String> = Gas::ALL
        .iter()
        .map(|gas| format!("{}: {}", gas.as_str(), gases.or_zero(*gas)))
        .collect();

    format!(
        "Act as an expert electrical engineer specializing in transformer \
         Dissolved Gas Analysis (DGA).\n\
         Analyze the following gas concentrations (in ppm) according to \
         IEC 60599, Duval Triangle, and Rogers Ratio methods:\n\n\
         {}\n\n\
         Provide a detailed diagnosis in {} covering:\n\
         1. Fault identification: e.g. PD, D1, D2, T1, T2, T3.\n\
         2. Analysis: why the suspected fault follows from the gas ratios \
         (e.g. high acetylene indicates arcing).\n\
         3. Severity: normal, warning, or critical.\n\
         4. Recommendation: operational actions (re-sample, internal \
         inspection, degassing, etc.).\n\n\
         Keep the response concise (max 200 words) and professional.",
        readings.join("\n"),
        language
    )
}

/// Diagnosis generator wrapping the text-generation collaborator with the
/// quota retry policy.
pub struct DiagnosisGenerator {
    client: Box<dyn GenerationClient + Send + Sync>,
    language: String,
    policy: RetryPolicy<InferenceError>,
}

impl DiagnosisGenerator {
    pub fn new(client: Box<dyn GenerationClient + Send + Sync>, language: &str) -> Self {
        Self {
            client,
            language: language.to_string(),
            policy: quota_retry_policy(),
        }
    }

    /// Production wiring, or `None` when the config carries no generation
    /// credential — callers surface that as "diagnosis unavailable".
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        let credential = config.generation_credential.as_deref()?;
        Some(Self::new(
            Box::new(GeminiClient::with_credential(
                credential,
                config.http_timeout_secs,
            )),
            &config.diagnosis_language,
        ))
    }

    /// Override the retry policy (tests use a zero-backoff variant).
    pub fn with_policy(mut self, policy: RetryPolicy<InferenceError>) -> Self {
        self.policy = policy;
        self
    }

    /// Generate a narrative diagnosis for a sample.
    ///
    /// Always returns text: the diagnosis on success, a user-facing error
    /// message embedding the failure detail otherwise.
    pub fn diagnose(&self, sample: &Sample) -> String {
        let prompt = build_diagnosis_prompt(&sample.gases, &self.language);

        match call_with_policy(&self.policy, || self.client.generate(&prompt)) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Diagnosis generation failed");
                format!(
                    "فشل في الاتصال بالذكاء الاصطناعي: {e}\nتأكد من صحة مفتاح API."
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::inference::MockGenerationClient;
    use std::sync::Mutex;

    /// Generation client that fails N times with a given error builder,
    /// then succeeds.
    struct FlakyClient {
        failures: u32,
        calls: Mutex<u32>,
        error: fn() -> InferenceError,
    }

    impl FlakyClient {
        fn new(failures: u32, error: fn() -> InferenceError) -> Self {
            Self {
                failures,
                calls: Mutex::new(0),
                error,
            }
        }
    }

    impl GenerationClient for FlakyClient {
        fn generate(&self, _prompt: &str) -> Result<String, InferenceError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls <= self.failures {
                Err((self.error)())
            } else {
                Ok("التشخيص: حالة طبيعية".to_string())
            }
        }
    }

    fn zero_backoff_policy() -> RetryPolicy<InferenceError> {
        RetryPolicy::new(MAX_ATTEMPTS, |_| Duration::ZERO, is_quota_error)
    }

    fn quota_error() -> InferenceError {
        InferenceError::ApiError {
            status: 429,
            message: "Resource exhausted: quota".into(),
        }
    }

    fn auth_error() -> InferenceError {
        InferenceError::ApiError {
            status: 401,
            message: "API key invalid".into(),
        }
    }

    #[test]
    fn prompt_carries_all_nine_gases_with_zero_defaults() {
        let gases = GasReadings {
            h2: Some(50.0),
            ch4: Some(10.0),
            ..Default::default()
        };
        let prompt = build_diagnosis_prompt(&gases, "Arabic");
        assert!(prompt.contains("H2: 50"));
        assert!(prompt.contains("CH4: 10"));
        // Missing gases go in as zero, not omitted.
        assert!(prompt.contains("C2H2: 0"));
        assert!(prompt.contains("N2: 0"));
    }

    #[test]
    fn prompt_names_methods_language_and_cap() {
        let prompt = build_diagnosis_prompt(&GasReadings::default(), "Arabic");
        assert!(prompt.contains("IEC 60599"));
        assert!(prompt.contains("Duval Triangle"));
        assert!(prompt.contains("Rogers Ratio"));
        assert!(prompt.contains("in Arabic"));
        assert!(prompt.contains("max 200 words"));
        assert!(prompt.contains("Fault identification"));
        assert!(prompt.contains("Recommendation"));
    }

    #[test]
    fn success_returns_generated_text() {
        let generator = DiagnosisGenerator::new(
            Box::new(MockGenerationClient::new("تشخيص تجريبي")),
            "Arabic",
        );
        assert_eq!(generator.diagnose(&Sample::new()), "تشخيص تجريبي");
    }

    #[test]
    fn quota_failures_are_retried_to_success() {
        let generator = DiagnosisGenerator::new(
            Box::new(FlakyClient::new(2, quota_error)),
            "Arabic",
        )
        .with_policy(zero_backoff_policy());

        let text = generator.diagnose(&Sample::new());
        assert!(text.contains("التشخيص"), "expected success after retries: {text}");
    }

    #[test]
    fn quota_exhaustion_yields_error_text() {
        // Fails more times than the attempt cap allows.
        let generator = DiagnosisGenerator::new(
            Box::new(FlakyClient::new(MAX_ATTEMPTS, quota_error)),
            "Arabic",
        )
        .with_policy(zero_backoff_policy());

        let text = generator.diagnose(&Sample::new());
        assert!(text.contains("فشل في الاتصال"), "got: {text}");
        assert!(text.contains("429"), "failure detail must be embedded: {text}");
    }

    #[test]
    fn non_quota_failure_is_not_retried() {
        let client = FlakyClient::new(1, auth_error);
        let generator =
            DiagnosisGenerator::new(Box::new(client), "Arabic").with_policy(zero_backoff_policy());

        let text = generator.diagnose(&Sample::new());
        assert!(text.contains("فشل في الاتصال"));
        assert!(text.contains("API key invalid"));
    }

    #[test]
    fn from_config_requires_generation_credential() {
        let config = EngineConfig::new(crate::models::ThresholdTable::default());
        assert!(DiagnosisGenerator::from_config(&config).is_none());

        let config = config.with_generation_credential("key");
        let generator = DiagnosisGenerator::from_config(&config).unwrap();
        assert_eq!(generator.language, "Arabic");
    }

    #[test]
    fn diagnose_never_returns_empty() {
        let generator = DiagnosisGenerator::new(
            Box::new(FlakyClient::new(u32::MAX, auth_error)),
            "Arabic",
        )
        .with_policy(zero_backoff_policy());

        assert!(!generator.diagnose(&Sample::new()).is_empty());
    }
}
