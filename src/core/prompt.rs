use crate::core::ReviewContext;

pub struct ReviewPromptBuilder;

impl ReviewPromptBuilder {
    /// Builds the system and user prompts for a misformalization review.
    ///
    /// The reviewer-comments block is inserted only when comments are
    /// present, so the numbered inventory never shows an empty section.
    pub fn build_review_prompt(context: &ReviewContext) -> (String, String) {
        let system_prompt = "You are a meticulous senior engineer specializing in formal \
            verification. Your task is to rigorously review a pull request for \
            misformalization issues.";

        let additional_comments_section = if context.additional_comments.trim().is_empty() {
            String::new()
        } else {
            format!(
                "\n**4. Additional Reviewer Comments:**\n---\n{}\n---\n",
                context.additional_comments
            )
        };

        let user_prompt = format!(
            r#"You have been given the following information:
1.  The content of external reference documents, which contains the formal specification.
2.  The full content of other relevant files from the repository.
3.  The code changes ("diff") from the pull request that intends to implement the specification.
{additional_comments_section}
**1. External Reference Documents (Specification):**
---
{external_context}
---

**2. Additional Repository Context Files:**
---
{repo_context}
---

**3. Pull Request Diff:**
---
{diff}
---

**Your Instructions:**
Follow these steps precisely to conduct your review:
1.  **Summarize Goal:** In a single sentence, state the primary goal of this pull request based on the provided context.
2.  **Identify Specification:** Quote the specific section(s) from the "External Reference Documents" that the PR is attempting to formalize.
3.  **Analyze Implementation:** Go through the "Pull Request Diff" hunk by hunk. For each change, analyze its logic and correctness. Explicitly map the code changes back to the specification you identified.
4.  **Check for Misformalization:** Critically assess whether the code is a correct and complete formalization of the specification. Pay close attention to edge cases, logical inconsistencies, incorrect assumptions, or deviations from the formal model.
5.  **Provide Verdict:** State clearly whether the formalization is correct or incorrect.
6.  **Actionable Feedback:** If the formalization is incorrect, provide a detailed explanation of the misformalization. Explain *why* it is wrong and illustrate your point with corrected code snippets. If the formalization is correct, state that and suggest any minor improvements if applicable.

Structure your review clearly using markdown for formatting."#,
            additional_comments_section = additional_comments_section,
            external_context = context.external_context,
            repo_context = context.repo_context,
            diff = context.diff,
        );

        (system_prompt.to_string(), user_prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(comments: &str) -> ReviewContext {
        ReviewContext {
            diff: "diff --git a/Spec.lean b/Spec.lean".to_string(),
            external_context: "The protocol requires three rounds.".to_string(),
            repo_context: "def rounds := 3".to_string(),
            additional_comments: comments.to_string(),
            model: "gemini-3-pro-preview".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_all_three_context_sections() {
        let (system, user) = ReviewPromptBuilder::build_review_prompt(&context(""));

        assert!(system.contains("formal verification"));
        assert!(user.contains("**1. External Reference Documents (Specification):**"));
        assert!(user.contains("The protocol requires three rounds."));
        assert!(user.contains("**2. Additional Repository Context Files:**"));
        assert!(user.contains("def rounds := 3"));
        assert!(user.contains("**3. Pull Request Diff:**"));
        assert!(user.contains("diff --git a/Spec.lean b/Spec.lean"));
    }

    #[test]
    fn prompt_lists_all_six_review_steps() {
        let (_, user) = ReviewPromptBuilder::build_review_prompt(&context(""));

        for step in [
            "**Summarize Goal:**",
            "**Identify Specification:**",
            "**Analyze Implementation:**",
            "**Check for Misformalization:**",
            "**Provide Verdict:**",
            "**Actionable Feedback:**",
        ] {
            assert!(user.contains(step), "missing step {}", step);
        }
    }

    #[test]
    fn empty_comments_omit_the_reviewer_comments_section() {
        let (_, user) = ReviewPromptBuilder::build_review_prompt(&context(""));
        assert!(!user.contains("Additional Reviewer Comments"));

        let (_, user) = ReviewPromptBuilder::build_review_prompt(&context("   \n\t"));
        assert!(!user.contains("Additional Reviewer Comments"));
    }

    #[test]
    fn present_comments_render_the_reviewer_comments_section() {
        let (_, user) =
            ReviewPromptBuilder::build_review_prompt(&context("Focus on the third lemma."));
        assert!(user.contains("**4. Additional Reviewer Comments:**"));
        assert!(user.contains("Focus on the third lemma."));
    }
}
