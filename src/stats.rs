use crate::extractor::REQUIREMENTS_NOT_FOUND;

const AWS_TOKENS: [&str; 2] = ["aws", "amazon"];
const AZURE_TOKENS: [&str; 1] = ["azure"];

/// Per-offer cloud mentions. Each counter moves at most once per observed text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CloudMentions {
    pub aws_count: u32,
    pub azure_count: u32,
    pub both_count: u32,
}

impl CloudMentions {
    pub fn observe(&mut self, requirements: &str) {
        if requirements == REQUIREMENTS_NOT_FOUND {
            return;
        }

        let text = requirements.to_lowercase();
        let aws_present = AWS_TOKENS.iter().any(|t| text.contains(t));
        let azure_present = AZURE_TOKENS.iter().any(|t| text.contains(t));

        if aws_present {
            self.aws_count += 1;
        }
        if azure_present {
            self.azure_count += 1;
        }
        if aws_present && azure_present {
            self.both_count += 1;
        }
    }
}
