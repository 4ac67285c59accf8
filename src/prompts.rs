//! Instructional prompt templates.
//!
//! Pure formatting: each function interpolates its arguments into a fixed
//! template and never touches the network.

/// Ask for a beginner-friendly explanation of a topic
pub fn explain_topic(topic: &str) -> String {
    format!(
        "Explain the research topic in simple, beginner-friendly terms: {}",
        topic.trim()
    )
}

/// Ask for the method, results and conclusion of one paper
pub fn summarize_paper(title: &str, summary: &str) -> String {
    format!(
        "You are an expert research assistant. A student is reading this paper titled:

Title: {title}

Abstract:
{summary}

Extract the following clearly and concisely:
1. Method (how the study was done)
2. Results (what the study found)
3. Conclusion (final takeaway)
Respond in Markdown format.
",
        title = title.trim(),
        summary = summary.trim()
    )
}

/// Ask for the research gap shared by a set of papers.
///
/// Each paper is a `(title, summary)` pair; blank titles are rendered as
/// "Untitled".
pub fn research_gap(papers: &[(&str, &str)]) -> String {
    let listing = papers
        .iter()
        .enumerate()
        .map(|(i, (title, summary))| {
            let title = if title.trim().is_empty() {
                "Untitled"
            } else {
                title.trim()
            };
            format!("Paper {}:\nTitle: {}\nSummary: {}", i + 1, title, summary.trim())
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an expert research advisor. Below are summaries of related research papers.

{listing}

Based on these papers, answer in Markdown:
(a) What common research gap or limitation do they share?
(b) Why does this gap matter?
(c) What is a concrete next step a student could take to address it?
"
    )
}

/// Ask for a methodology addressing `gap` within `topic`
pub fn methodology(topic: &str, gap: &str) -> String {
    format!(
        "You are an experienced research mentor.

Research topic: {topic}

Identified research gap:
{gap}

Suggest how a student could address this gap. Respond in Markdown with:
1. Methodology (the research approach and design)
2. Tools and datasets (software, libraries and public datasets to use)
3. A short plan (a few concrete steps to get started)
",
        topic = topic.trim(),
        gap = gap.trim()
    )
}
