//! Renders retrieved chunks into the context block of the prompt.
//!
//! Each chunk becomes one labeled segment carrying its 1-based position,
//! policy id and product type, in the order the search returned them.

use super::store::RetrievedChunk;

/// Substituted for the context block when the search matched nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "(没有找到相关内容)";

/// Label used when a chunk carries no policy id or product type.
pub const UNKNOWN_PRODUCT_TYPE: &str = "未知";

const SEGMENT_SEPARATOR: &str = "\n\n------\n\n";

pub fn build_context_block(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_PLACEHOLDER.to_string();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format_segment(i + 1, chunk))
        .collect::<Vec<_>>()
        .join(SEGMENT_SEPARATOR)
}

pub fn product_type_label(chunk: &RetrievedChunk) -> &str {
    chunk
        .product_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_PRODUCT_TYPE)
}

fn policy_id_label(chunk: &RetrievedChunk) -> &str {
    match chunk.policy_id.trim() {
        "" => UNKNOWN_PRODUCT_TYPE,
        id => id,
    }
}

fn format_segment(index: usize, chunk: &RetrievedChunk) -> String {
    format!(
        "【片段{} | 保单：{} | 险种：{}】\n\n{}",
        index,
        policy_id_label(chunk),
        product_type_label(chunk),
        chunk.chunk_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(policy_id: &str, product_type: Option<&str>, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            policy_id: policy_id.to_string(),
            product_type: product_type.map(str::to_string),
            chunk_text: text.to_string(),
            similarity: None,
        }
    }

    #[test]
    fn empty_result_renders_placeholder() {
        let context = build_context_block(&[]);
        assert_eq!(context, NO_CONTEXT_PLACEHOLDER);
        assert!(!context.is_empty());
    }

    #[test]
    fn segments_follow_retrieval_order() {
        let chunks = vec![
            make_chunk("P7", Some("重疾险"), "等待期为90天。"),
            make_chunk("P3", Some("医疗险"), "住院费用100%报销。"),
            make_chunk("P5", None, "免赔额为1万元。"),
        ];

        let context = build_context_block(&chunks);
        let segments: Vec<&str> = context.split(SEGMENT_SEPARATOR).collect();

        assert_eq!(segments.len(), 3);
        assert!(segments[0].starts_with("【片段1 | 保单：P7 | 险种：重疾险】"));
        assert!(segments[1].starts_with("【片段2 | 保单：P3 | 险种：医疗险】"));
        assert!(segments[2].starts_with("【片段3 | 保单：P5 | 险种：未知】"));
        assert!(segments[1].ends_with("住院费用100%报销。"));
    }

    #[test]
    fn blank_product_type_is_unknown() {
        let chunk = make_chunk("P1", Some("  "), "text");
        assert_eq!(product_type_label(&chunk), UNKNOWN_PRODUCT_TYPE);
    }

    #[test]
    fn missing_policy_id_is_unknown() {
        let context = build_context_block(&[make_chunk("", Some("医疗险"), "门诊报销。")]);
        assert_eq!(context, "【片段1 | 保单：未知 | 险种：医疗险】\n\n门诊报销。");
    }

    #[test]
    fn single_chunk_has_no_separator() {
        let context = build_context_block(&[make_chunk("P1", Some("意外险"), "身故赔付。")]);
        assert_eq!(context, "【片段1 | 保单：P1 | 险种：意外险】\n\n身故赔付。");
    }
}
