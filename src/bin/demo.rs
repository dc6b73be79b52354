//! Walks a few sample sentences through the fixer and prints the JSON
//! response shape the API returns.

use std::sync::Arc;

use grammar_fixer_api::api::FixResponse;
use grammar_fixer_api::detector::NoopDetector;
use grammar_fixer_api::grammar::GrammarFixer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Grammar Fixer - demo");
    println!("====================\n");

    let example_texts = [
        "She dont like apples",
        "He go to school everyday",
        "They was happy to see me",
    ];

    let fixer = GrammarFixer::new(Arc::new(NoopDetector));

    for text in example_texts {
        println!("Original text: {text:?}");

        let corrections = fixer.fix_grammar(text).await?;
        if corrections.is_empty() {
            println!("No corrections found (or placeholder detector active)\n");
            continue;
        }

        let response = FixResponse {
            corrections,
            original_text: text.to_string(),
        };
        println!("{}\n", serde_json::to_string_pretty(&response)?);
    }

    Ok(())
}
