// ABOUTME: Context composition - appends upstream task results to a rendered
// ABOUTME: description as "\n[<task id>]: <result>" blocks, in dependency order.

/// Build a node's effective prompt.
///
/// Each upstream `(id, result)` pair adds `"\n[<id>]: <result>"` after the
/// description. Results are inserted verbatim.
pub fn compose<'a>(
    description: &str,
    upstream: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut prompt = description.to_string();
    for (id, result) in upstream {
        prompt.push_str("\n[");
        prompt.push_str(id);
        prompt.push_str("]: ");
        prompt.push_str(result);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_upstream() {
        assert_eq!(compose("Respond to hi", []), "Respond to hi");
    }

    #[test]
    fn test_single_upstream() {
        assert_eq!(
            compose("Summarize: ", [("collect", "AI is popular.")]),
            "Summarize: \n[collect]: AI is popular."
        );
    }

    #[test]
    fn test_fan_in_keeps_order() {
        let prompt = compose(
            "Analyse",
            [("get_financials", "P/E 12"), ("get_news", "Steel demand up")],
        );
        assert_eq!(prompt, "Analyse\n[get_financials]: P/E 12\n[get_news]: Steel demand up");
    }

    #[test]
    fn test_result_braces_untouched() {
        let prompt = compose("Next", [("prev", "{\"price\": {value}}")]);
        assert!(prompt.ends_with("[prev]: {\"price\": {value}}"));
    }
}
