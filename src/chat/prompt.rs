use super::question::Question;

const ROLE_INSTRUCTION: &str =
    "你是一名严谨的保险产品顾问，请根据以下保单条款内容回答用户的问题。";

const ANSWER_INSTRUCTION: &str = "请仅基于上述条款内容回答。如果条款中没有足够的信息，请明确说明无法确定，不要编造条款中不存在的内容。";

/// Composes the generation prompt from the question and the rendered context block.
pub fn build_prompt(question: &Question, context_block: &str) -> String {
    format!(
        "{}\n\n【用户问题】\n{}\n\n【检索到的保单条款片段】\n{}\n\n{}",
        ROLE_INSTRUCTION,
        question.as_str(),
        context_block,
        ANSWER_INSTRUCTION
    )
}
