//! Prompt construction for the feedback model

use super::ReviewRequest;

/// Build the review prompt for a request and the aggregated repository content
pub fn build_prompt(request: &ReviewRequest, repo_content: &str) -> String {
    let level = request.candidate_level();

    format!(
        "Review the following test assignment for a {level} candidate.\n\n\
         Assignment Description: {description}\n\n\
         Candidate code:\n{repo_content}\n\n\
         Analyze the code and provide feedback in the following structured format, \
         limited to 255 words:\n\n\
         1. **Downsides**: Highlight the major issues in the code.\n\
         2. **Documentation and comments**: Assess the quality of comments and documentation.\n\
         3. **Rating**: Evaluate the code quality on a scale of 1 to 5 based on the candidate's level ({level}).\n\
         4. **Conclusion**: Summarize the analysis and provide overall recommendations for improvement.\n\n\
         Provide concise and actionable feedback.",
        level = level,
        description = request.assignment_description(),
        repo_content = repo_content,
    )
}
