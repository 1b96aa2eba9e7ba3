// ABOUTME: Ready-made crews - a single responder, a research and summary pair,
// ABOUTME: a web-backed stock analysis, and a full investment advisor.

use crate::agent::AgentProfile;
use crate::error::PipelineError;
use crate::pipeline::{PipelineBuilder, PipelineDefinition, TaskNode};
use crate::template::Inputs;

const GROQ_LLAMA3: &str = "groq/llama3-70b-8192";
const GPT_4O_MINI: &str = "gpt-4o-mini";
const SEARCH_TOOL: &str = "duckduckgo_search";

/// A named crew and the inputs it expects.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,

    /// Input names with example values.
    pub inputs: &'static [(&'static str, &'static str)],

    build: fn(&str) -> Result<PipelineDefinition, PipelineError>,
}

impl Preset {
    /// Build the crew; `today` is stamped into agents that need the date.
    pub fn definition(&self, today: &str) -> Result<PipelineDefinition, PipelineError> {
        (self.build)(today)
    }

    /// The example inputs as a bundle.
    pub fn example_inputs(&self) -> Inputs {
        self.inputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// Every preset, in tutorial order.
pub const PRESETS: &[Preset] = &[
    Preset {
        name: "query",
        description: "One agent answers a query",
        inputs: &[("query", "What is Bangalore famously known for?")],
        build: |_| query(),
    },
    Preset {
        name: "explore",
        description: "Two agents research a topic and summarise it",
        inputs: &[("topic", "AI in software industry")],
        build: |_| explore(),
    },
    Preset {
        name: "research",
        description: "Web research, analysis and a buy / no buy call for a stock",
        inputs: &[("stock", "Tata Steel")],
        build: research,
    },
    Preset {
        name: "invest",
        description: "Financial data, news, analysis and an investment recommendation",
        inputs: &[("stock", "Hdfc Bank")],
        build: invest,
    },
];

/// Look up a preset by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// A single responder answering `{query}`.
pub fn query() -> Result<PipelineDefinition, PipelineError> {
    let chat_bot = AgentProfile::new(
        "chat_bot",
        "Responder to Queries",
        "Provide a response to {query}",
        "A generalist having broad view about various topics, you will be able to answer \
         to the queries, questions or statements",
    )
    .model(GROQ_LLAMA3);

    PipelineBuilder::new()
        .agent(chat_bot)
        .node(TaskNode::new("chat", "{query}", "chat_bot").expected_output("A response to {query}"))
        .build()
}

/// An explorer gathers information on `{topic}`; a synthesiser summarises it.
pub fn explore() -> Result<PipelineDefinition, PipelineError> {
    let explorer = AgentProfile::new(
        "explorer",
        "Data Explorer",
        "Research, gather and provide information about the topic : {topic}",
        "You are an expert researcher, who can gather detailed information about a topic",
    )
    .model(GROQ_LLAMA3);

    let synthesiser = AgentProfile::new(
        "synthesiser",
        "Information Synthesiser",
        "Summarise the information given in a synthetic manner",
        "You are an expert in summarising provided information in a simple, concise and \
         synthetic way",
    )
    .model(GROQ_LLAMA3);

    PipelineBuilder::new()
        .agents([explorer, synthesiser])
        .node(
            TaskNode::new(
                "explore",
                "Explore and gather information about topic : {topic}",
                "explorer",
            )
            .expected_output("Information from various sources and aspect about {topic}"),
        )
        .node(
            TaskNode::new("summarise", "Summarise provided information", "synthesiser")
                .expected_output("Simple, concise, synthetic summary of provided information")
                .depends_on(["explore"]),
        )
        .build()
}

/// Web research on `{stock}`, an analysis, then a recommendation.
pub fn research(today: &str) -> Result<PipelineDefinition, PipelineError> {
    let content_explorer = AgentProfile::new(
        "content_explorer",
        "data researcher",
        "Gather and provide latest information about the topic from internet",
        format!(
            "You are an expert researcher, who can gather detailed information about a topic. \
             Consider you are on : {}",
            today
        ),
    )
    .model(GPT_4O_MINI)
    .tools([SEARCH_TOOL])
    .cache(true)
    .max_iterations(5);

    let analyst = AgentProfile::new(
        "analyst",
        "Data Analyst",
        "Consolidate financial data, stock information and provide a summary",
        format!(
            "You are an expert in analysing financial data and stock related information to \
             make it into a analysis summary. Consider you are on {}",
            today
        ),
    )
    .model(GPT_4O_MINI);

    let fin_expert = AgentProfile::new(
        "fin_expert",
        "Financial Expert",
        "Considering Financial analysis of a stock, make investment recommendation",
        format!(
            "You are financial advisor, who can provide investment recommendation. Consider the \
             financial analysis and make recommendation whether to buy a stock or not. \
             Consider you are on {}",
            today
        ),
    )
    .model(GPT_4O_MINI);

    PipelineBuilder::new()
        .agents([content_explorer, analyst, fin_expert])
        .node(
            TaskNode::new(
                "get_company_financials",
                "Get latest financial data for stock : {stock}",
                "content_explorer",
            )
            .expected_output("Latest data about balance sheet, cash flow, profit for stock {stock}"),
        )
        .node(
            TaskNode::new(
                "analyse",
                "Make thorough analysis based on given financial data of a stock",
                "analyst",
            )
            .expected_output(
                "Comprehensive Analysis of a stock outlining financial health, stock valuation \
                 and risks",
            )
            .depends_on(["get_company_financials"])
            .output_sink("Analysis.txt"),
        )
        .node(
            TaskNode::new(
                "advise",
                "Make a recommendation about investing in a stock, based on analysis provided",
                "analyst",
            )
            .expected_output("Recommendation (Buy / No Buy) of a stock, with reasons clearly mentioned")
            .depends_on(["analyse"])
            .output_sink("Recommendation.txt"),
        )
        .build()
}

/// Financial data and news on `{stock}` feed an analysis and a recommendation.
pub fn invest(today: &str) -> Result<PipelineDefinition, PipelineError> {
    let news_info_explorer = AgentProfile::new(
        "news_info_explorer",
        "news and info researcher",
        "Gather and provide latest information and news about a company from internet and \
         sythesise",
        format!(
            "You are an expert researcher, who can gather detailed information about a company. \
             Consider you are on : {}",
            today
        ),
    )
    .model(GPT_4O_MINI)
    .tools([SEARCH_TOOL])
    .cache(true)
    .max_iterations(5);

    let data_explorer = AgentProfile::new(
        "data_explorer",
        "data researcher",
        "Gather and provide financial data and company information about a stock",
        format!(
            "You are an expert researcher, who can gather detailed information about a company \
             or stock. When you use the tools, add suffix '.NS' to symbol agrument. \
             Consider you are on : {}",
            today
        ),
    )
    .model(GPT_4O_MINI)
    .tools(["get_company_info", "get_income_statements"])
    .cache(true)
    .max_iterations(5);

    let analyst = AgentProfile::new(
        "analyst",
        "Data Analyst",
        "Consolidate financial data, stock information and provide a summary",
        format!(
            "You are an expert in analysing financial data of a company, stock / company related \
             current information and make it into a analysis summary. You are making analyis \
             about indian companies. Use indian units for numbers (lakh, crore) accordingly. \
             Consider you are on {}",
            today
        ),
    )
    .model(GPT_4O_MINI);

    let fin_expert = AgentProfile::new(
        "fin_expert",
        "Financial Expert",
        "Considering Financial analysis of a stock, make investment recommendation",
        format!(
            "You are an expert financial advisor who can provide investment recommendation. \
             Consider the financial analysis, current information about company, current stock \
             price and make recommendation whether to buy a stock or not. When you use the \
             tools, add suffix '.NS' to symbol agrument. Consider you are on {}",
            today
        ),
    )
    .model(GPT_4O_MINI)
    .tools(["get_current_stock_price"])
    .max_iterations(5);

    PipelineBuilder::new()
        .agents([data_explorer, news_info_explorer, analyst, fin_expert])
        .node(
            TaskNode::new(
                "get_company_financials",
                "Get financial data like inccome statements and other fundamental ratios for \
                 stock : {stock}",
                "data_explorer",
            )
            .expected_output(
                "Detailed information from income statement, key ratios for {stock}. Indicate \
                 also about current financial status and trend over the period.",
            ),
        )
        .node(
            TaskNode::new(
                "get_company_news",
                "Get latest news and business information about company : {stock}",
                "news_info_explorer",
            )
            .expected_output("Latest news and business information about company. Provide a summary also."),
        )
        .node(
            TaskNode::new(
                "analyse",
                "Make thorough analysis based on given financial data and latest news of a stock",
                "analyst",
            )
            .expected_output(
                "Comprehensive Analysis of a stock outlining financial health, stock valuation, \
                 risks and news. Mention currency information and number units in indian \
                 context (lakh / crore)",
            )
            .depends_on(["get_company_financials", "get_company_news"])
            .output_sink("Analysis.md"),
        )
        .node(
            TaskNode::new(
                "advise",
                "Make a recommendation about investing in a stock, based on analysis provided \
                 and current stock price. State the reasons.",
                "fin_expert",
            )
            .expected_output("Recommendation (Buy / No Buy) of a stock, with reasons clearly mentioned")
            .depends_on(["analyse"])
            .output_sink("Recommendation.md"),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "18-Oct-2026";

    #[test]
    fn test_every_preset_builds() {
        for preset in PRESETS {
            let def = preset.definition(TODAY).unwrap();
            assert!(!def.is_empty(), "{} is empty", preset.name);
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("invest").unwrap().name, "invest");
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_example_inputs_cover_placeholders() {
        for preset in PRESETS {
            let def = preset.definition(TODAY).unwrap();
            let inputs = preset.example_inputs();
            for node in def.nodes() {
                assert!(node.render_description(&inputs).is_ok(), "{}", node.id);
                assert!(node.render_expected_output(&inputs).is_ok(), "{}", node.id);
                let agent = def.agent(&node.agent_ref).unwrap();
                assert!(agent.render(&inputs).is_ok(), "{}", agent.id);
            }
        }
    }

    #[test]
    fn test_explore_is_linear() {
        let def = explore().unwrap();
        let order: Vec<_> = def.execution_order().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["explore", "summarise"]);
        assert_eq!(def.node("summarise").unwrap().depends_on, vec!["explore"]);
    }

    #[test]
    fn test_invest_fans_in() {
        let def = invest(TODAY).unwrap();
        let analyse = def.node("analyse").unwrap();
        assert_eq!(
            analyse.depends_on,
            vec!["get_company_financials", "get_company_news"]
        );
        assert_eq!(def.final_node().unwrap().id, "advise");
        assert_eq!(
            def.node("advise").unwrap().output_sink.as_deref(),
            Some(std::path::Path::new("Recommendation.md"))
        );
    }

    #[test]
    fn test_date_stamped_into_backstory() {
        let def = research(TODAY).unwrap();
        assert!(
            def.agent("content_explorer")
                .unwrap()
                .backstory
                .ends_with("Consider you are on : 18-Oct-2026")
        );
        assert_eq!(def.agent("content_explorer").unwrap().max_iterations, Some(5));
    }

    #[test]
    fn test_tool_names_are_builtin() {
        let builtin = [
            "duckduckgo_search",
            "get_current_stock_price",
            "get_company_info",
            "get_income_statements",
        ];
        for preset in PRESETS {
            for agent in preset.definition(TODAY).unwrap().agents() {
                for tool in &agent.tools {
                    assert!(builtin.contains(&tool.as_str()), "{tool}");
                }
            }
        }
    }
}
