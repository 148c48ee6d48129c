//! Reply rendering

use anyhow::Result;
use futures::StreamExt;
use parley_llm::cost::{format_usage_line, format_usage_stats};
use parley_llm::{ExchangeContent, ExchangeResult, UsageRecord};
use std::io::Write;

/// Printed when stats are requested for a streamed reply
pub const STREAMING_STATS_NOTICE: &str = "⚠️  Token usage stats not available in streaming mode";

/// Write the reply text; streamed fragments are flushed as they arrive.
///
/// Returns the usage of blocking exchanges. A stream error is returned after
/// the fragments already printed.
pub async fn write_reply<W: Write>(out: &mut W, result: ExchangeResult) -> Result<Option<UsageRecord>> {
    match result.content {
        ExchangeContent::Text(text) => {
            writeln!(out, "{}", text)?;
        }
        ExchangeContent::Stream(mut stream) => {
            while let Some(fragment) = stream.next().await {
                match fragment {
                    Ok(fragment) => {
                        write!(out, "{}", fragment)?;
                        out.flush()?;
                    }
                    Err(err) => {
                        writeln!(out)?;
                        return Err(err.into());
                    }
                }
            }
            writeln!(out)?;
        }
    }
    Ok(result.usage)
}

/// Full stats block (single-shot)
pub fn write_stats<W: Write>(out: &mut W, usage: Option<&UsageRecord>) -> Result<()> {
    match usage {
        Some(record) => writeln!(out, "\n{}", format_usage_stats(record))?,
        None => writeln!(out, "\n{}", STREAMING_STATS_NOTICE)?,
    }
    Ok(())
}

/// Compact usage tag, plus the running session digest when there is one
pub fn write_usage_line<W: Write>(
    out: &mut W,
    usage: Option<&UsageRecord>,
    session_summary: Option<&str>,
) -> Result<()> {
    match usage {
        Some(record) => writeln!(out, "\n{}", format_usage_line(record))?,
        None => writeln!(out, "\n{}", STREAMING_STATS_NOTICE)?,
    }
    if let Some(summary) = session_summary {
        writeln!(out, "[{}]", summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_llm::{
        BackendError, ChatSession, CostEstimator, DeliveryMode, MockBackend, SessionConfig,
        TokenUsage,
    };
    use std::sync::Arc;

    fn session(backend: &Arc<MockBackend>) -> ChatSession {
        ChatSession::new(backend.clone(), SessionConfig::new("gpt-4o-mini")).unwrap()
    }

    fn rendered(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_blocking_reply_rendered() {
        let backend = Arc::new(MockBackend::new());
        backend.push_reply("Paris.", 12, 6);
        let session = session(&backend);

        let result = session.exchange("Capital?", DeliveryMode::Blocking).await.unwrap();
        let mut out = Vec::new();
        let usage = write_reply(&mut out, result).await.unwrap();
        write_stats(&mut out, usage.as_ref()).unwrap();

        let text = rendered(out);
        assert!(text.starts_with("Paris.\n"));
        assert!(text.contains("📊 Token Usage Stats:"));
        assert!(text.contains("Estimated cost: $0.000005"));
    }

    #[tokio::test]
    async fn test_streamed_reply_commits() {
        let backend = Arc::new(MockBackend::new());
        backend.push_fragments(["Once ", "upon ", "a time"]);
        let session = session(&backend);

        let result = session.exchange("Story", DeliveryMode::Streaming).await.unwrap();
        let mut out = Vec::new();
        let usage = write_reply(&mut out, result).await.unwrap();
        write_usage_line(&mut out, usage.as_ref(), None).unwrap();

        assert!(usage.is_none());
        let text = rendered(out);
        assert!(text.starts_with("Once upon a time\n"));
        assert!(text.contains(STREAMING_STATS_NOTICE));
        assert_eq!(session.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_error_after_partial_output() {
        let backend = Arc::new(MockBackend::new());
        backend.push_interrupted(["Half"], BackendError::Network("reset".into()));
        let session = session(&backend);

        let result = session.exchange("Go", DeliveryMode::Streaming).await.unwrap();
        let mut out = Vec::new();
        let err = write_reply(&mut out, result).await.unwrap_err();

        assert!(err.to_string().contains("reset"));
        assert_eq!(rendered(out), "Half\n");
        assert_eq!(session.snapshot().await.len(), 1);
    }

    #[test]
    fn test_usage_line_with_summary() {
        let record =
            CostEstimator::default().usage_record("gpt-4o", &TokenUsage::new(1234, 567));
        let mut out = Vec::new();
        write_usage_line(&mut out, Some(&record), Some("1 exchange")).unwrap();

        assert_eq!(
            rendered(out),
            "\n[Tokens: 1,234 in, 567 out, $0.0088]\n[1 exchange]\n"
        );
    }
}
