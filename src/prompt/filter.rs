use crate::prompt::common::{
    ANSWER_MARKER, EXTRACTION_INSTRUCTIONS, QUERY_INTRODUCTION, QUERY_MARKER,
};
use crate::prompt::few_shot::{FewShotExample, FEW_SHOT_EXAMPLES};

fn render_example(index: usize, example: &FewShotExample) -> String {
    format!(
        "Example{index}\n{QUERY_MARKER} {query}\n{ANSWER_MARKER} {information}\n",
        index = index + 1,
        query = example.query,
        information = example.information,
    )
}

/// Build the prompt that asks the model for the filter of `query`.
///
/// Pure function of its input: the same query always yields the same bytes.
/// The query is inserted verbatim and the prompt ends with the answer marker
/// so that the model's continuation is the answer itself.
pub fn filter_extraction_prompt(query: &str) -> String {
    let examples = FEW_SHOT_EXAMPLES
        .iter()
        .enumerate()
        .map(|(index, example)| render_example(index, example))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{EXTRACTION_INSTRUCTIONS}\n{examples}\n{QUERY_INTRODUCTION}\n{QUERY_MARKER} {query}\n{ANSWER_MARKER} "
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let query = "Slides from the Q3 board meeting";
        assert_eq!(
            filter_extraction_prompt(query),
            filter_extraction_prompt(query)
        );
    }

    #[test]
    fn test_prompt_ends_with_answer_marker() {
        let prompt = filter_extraction_prompt("vacation videos");
        assert!(prompt.ends_with("### information: "));
        assert!(prompt.contains("### query: vacation videos\n### information: "));
    }

    #[test]
    fn test_prompt_contains_all_examples_in_order() {
        let prompt = filter_extraction_prompt("anything");
        let mut last = 0;
        for (index, example) in FEW_SHOT_EXAMPLES.iter().enumerate() {
            let header = format!("Example{}\n", index + 1);
            let position = prompt.find(&header).expect("example header");
            assert!(position >= last);
            assert!(prompt.contains(example.information));
            last = position;
        }
        // six examples plus the real query
        assert_eq!(prompt.matches(ANSWER_MARKER).count(), 7);
    }

    #[test]
    fn test_prompt_accepts_unusual_queries() {
        for query in ["", "   ", "### information: {}", "ünïcødé 文件 🚀", "a\nb\nc"] {
            let prompt = filter_extraction_prompt(query);
            assert!(prompt.ends_with(&format!("{QUERY_MARKER} {query}\n{ANSWER_MARKER} ")));
        }
    }
}
