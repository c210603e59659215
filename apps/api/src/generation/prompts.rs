// Prompt fragments for advice generation.
// Only the listing's title and employer are substituted; everything else is fixed
// so the model's output format stays stable.

use crate::listings::models::NormalizedListing;
use crate::resume::ResumeText;

pub const ROLE_PREAMBLE: &str = "Role: Career Coach;";

pub const READ_RESUME_STEP: &str = " Step 1: Read this resume content:\n\n";

pub const GAP_STEP: &str =
    "Step 2: Identify gaps in the resume relative to this job title and description: ";

pub const OUTPUT_FORMAT_STEPS: &str = "
Step 3: Provide a list of 3 key skills to develop, and a list of 3 concise resume changes to make (50 words or less).
Step 4: Format output as follows:
<job title>: job title at company name
<resume gaps>: list of identified gaps
<key skills to develop>: list of 3 key skills to develop
<resume changes to make>: list of 3 concise resume changes to make (50 words or less)
All labeled clearly with headers and use bulleted lists. Optimize for concise and readable output.";

/// Builds the single-turn prompt for one résumé/listing pair.
pub fn build_prompt(resume: &ResumeText, listing: &NormalizedListing) -> String {
    format!(
        "{ROLE_PREAMBLE}{READ_RESUME_STEP}{resume}\n\n{GAP_STEP}{title} at {employer}{OUTPUT_FORMAT_STEPS}",
        title = listing.job_title,
        employer = listing.employer,
    )
}
