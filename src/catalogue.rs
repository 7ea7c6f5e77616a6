//! Curriculum seed data: modules, their unit standards and the co-scheduling
//! groups that bind some of them to one date range.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const TOTAL_CREDITS: u32 = 140;
pub const REQUIRED_CREDITS: u32 = 138;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("topic {0} must last at least one working day")]
    ZeroDuration(String),
    #[error("module {0} appears more than once")]
    DuplicateModule(u32),
    #[error("module {current} follows module {previous}; modules must be in ascending order")]
    OutOfOrder { previous: u32, current: u32 },
    #[error("module {current} follows module {previous}; module numbers must not skip")]
    Gap { previous: u32, current: u32 },
    #[error("topic {0} appears more than once")]
    DuplicateTopic(String),
    #[error("co-scheduled group '{0}' has no topics")]
    EmptyGroup(String),
    #[error("catalogue credits sum to {computed} but the curriculum declares {declared}")]
    CreditMismatch { declared: u32, computed: u32 },
    #[error("required credits {required} exceed total credits {total}")]
    RequiredExceedsTotal { required: u32, total: u32 },
    #[error("could not read curriculum: {0}")]
    Io(String),
    #[error("could not parse curriculum: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSeed {
    pub id: String,
    pub title: String,
    pub credits: u32,
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
}

impl TopicSeed {
    pub fn new(id: &str, title: &str, credits: u32, duration_days: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            credits,
            duration_days,
            group_key: None,
        }
    }

    pub fn grouped(mut self, key: &str) -> Self {
        self.group_key = Some(key.to_string());
        self
    }
}

/// One schedulable unit: a lone topic, or topics sharing a single date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicBlock {
    Singleton(TopicSeed),
    CoScheduled { key: String, topics: Vec<TopicSeed> },
}

impl TopicBlock {
    pub fn topics(&self) -> &[TopicSeed] {
        match self {
            TopicBlock::Singleton(topic) => std::slice::from_ref(topic),
            TopicBlock::CoScheduled { topics, .. } => topics,
        }
    }

    pub fn group_key(&self) -> Option<&str> {
        match self {
            TopicBlock::Singleton(_) => None,
            TopicBlock::CoScheduled { key, .. } => Some(key),
        }
    }

    /// Working days the block occupies; a group runs for its leader's duration.
    pub fn duration_days(&self) -> u32 {
        self.topics().first().map_or(0, |t| t.duration_days)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ModuleSeedRecord", into = "ModuleSeedRecord")]
pub struct ModuleSeed {
    pub module_number: u32,
    pub name: String,
    pub blocks: Vec<TopicBlock>,
}

/// Flat wire form of a module: topics in catalogue order, grouping by key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleSeedRecord {
    module_number: u32,
    name: String,
    topics: Vec<TopicSeed>,
}

impl From<ModuleSeedRecord> for ModuleSeed {
    fn from(record: ModuleSeedRecord) -> Self {
        ModuleSeed::from_tagged(record.module_number, &record.name, record.topics)
    }
}

impl From<ModuleSeed> for ModuleSeedRecord {
    fn from(module: ModuleSeed) -> Self {
        let topics = module.topics().cloned().collect();
        Self {
            module_number: module.module_number,
            name: module.name,
            topics,
        }
    }
}

impl ModuleSeed {
    pub fn new(module_number: u32, name: &str, blocks: Vec<TopicBlock>) -> Self {
        Self {
            module_number,
            name: name.to_string(),
            blocks,
        }
    }

    /// Build blocks from a flat topic list. Every member of a group is
    /// collected into one block placed where the group's first member sits.
    pub fn from_tagged(module_number: u32, name: &str, topics: Vec<TopicSeed>) -> Self {
        let mut blocks: Vec<TopicBlock> = Vec::new();
        for topic in topics {
            let Some(key) = topic.group_key.clone() else {
                blocks.push(TopicBlock::Singleton(topic));
                continue;
            };
            let position = blocks
                .iter()
                .position(|block| block.group_key() == Some(key.as_str()));
            match position.map(|idx| &mut blocks[idx]) {
                Some(TopicBlock::CoScheduled { topics, .. }) => topics.push(topic),
                _ => blocks.push(TopicBlock::CoScheduled {
                    key,
                    topics: vec![topic],
                }),
            }
        }
        Self::new(module_number, name, blocks)
    }

    pub fn topics(&self) -> impl Iterator<Item = &TopicSeed> {
        self.blocks.iter().flat_map(|block| block.topics().iter())
    }

    pub fn total_credits(&self) -> u32 {
        self.topics().map(|t| t.credits).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub modules: Vec<ModuleSeed>,
    pub total_credits: u32,
    pub required_credits: u32,
}

impl Curriculum {
    pub fn new(modules: Vec<ModuleSeed>, total_credits: u32, required_credits: u32) -> Self {
        Self {
            modules,
            total_credits,
            required_credits,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let file = File::open(path).map_err(|err| CatalogueError::Io(err.to_string()))?;
        let curriculum: Curriculum =
            serde_json::from_reader(file).map_err(|err| CatalogueError::Parse(err.to_string()))?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    pub fn computed_credits(&self) -> u32 {
        self.modules.iter().map(ModuleSeed::total_credits).sum()
    }

    pub fn topic(&self, id: &str) -> Option<&TopicSeed> {
        self.modules
            .iter()
            .flat_map(|module| module.topics())
            .find(|topic| topic.id == id)
    }

    pub fn validate(&self) -> Result<(), CatalogueError> {
        let mut previous: Option<u32> = None;
        let mut topic_ids = HashSet::new();

        for module in &self.modules {
            if let Some(previous) = previous {
                if module.module_number == previous {
                    return Err(CatalogueError::DuplicateModule(previous));
                }
                if module.module_number < previous {
                    return Err(CatalogueError::OutOfOrder {
                        previous,
                        current: module.module_number,
                    });
                }
                if module.module_number > previous + 1 {
                    return Err(CatalogueError::Gap {
                        previous,
                        current: module.module_number,
                    });
                }
            }
            previous = Some(module.module_number);

            for block in &module.blocks {
                if let TopicBlock::CoScheduled { key, topics } = block {
                    if topics.is_empty() {
                        return Err(CatalogueError::EmptyGroup(key.clone()));
                    }
                }
                for topic in block.topics() {
                    if topic.duration_days == 0 {
                        return Err(CatalogueError::ZeroDuration(topic.id.clone()));
                    }
                    if !topic_ids.insert(topic.id.as_str()) {
                        return Err(CatalogueError::DuplicateTopic(topic.id.clone()));
                    }
                }
            }
        }

        let computed = self.computed_credits();
        if computed != self.total_credits {
            return Err(CatalogueError::CreditMismatch {
                declared: self.total_credits,
                computed,
            });
        }
        if self.required_credits > self.total_credits {
            return Err(CatalogueError::RequiredExceedsTotal {
                required: self.required_credits,
                total: self.total_credits,
            });
        }
        Ok(())
    }

    /// The shipped six-module programme.
    pub fn standard() -> Self {
        let modules = vec![
            ModuleSeed::from_tagged(
                1,
                "Fundamental Communication and Numeracy",
                vec![
                    TopicSeed::new(
                        "119472",
                        "Accommodate audience and context needs in oral communication",
                        5,
                        5,
                    ),
                    TopicSeed::new("119457", "Interpret and use information from texts", 5, 5)
                        .grouped("literacy"),
                    TopicSeed::new(
                        "119465",
                        "Write texts for a range of communicative contexts",
                        5,
                        5,
                    )
                    .grouped("literacy"),
                    TopicSeed::new(
                        "9010",
                        "Demonstrate an understanding of the use of different number formats",
                        2,
                        3,
                    )
                    .grouped("numeracy"),
                    TopicSeed::new(
                        "9012",
                        "Investigate life and work related problems using data and probabilities",
                        5,
                        3,
                    )
                    .grouped("numeracy"),
                    TopicSeed::new(
                        "7456",
                        "Use mathematics to monitor the financial aspects of personal and business life",
                        5,
                        4,
                    ),
                ],
            ),
            ModuleSeed::from_tagged(
                2,
                "Business Technology",
                vec![
                    TopicSeed::new("116932", "Operate a personal computer system", 3, 3),
                    TopicSeed::new("116945", "Use a word processor to create documents", 3, 3),
                    TopicSeed::new("116943", "Use a spreadsheet to solve problems", 4, 4),
                    TopicSeed::new("117924", "Use the internet and electronic mail", 2, 2)
                        .grouped("digital"),
                    TopicSeed::new(
                        "116938",
                        "Use presentation software to produce presentations",
                        3,
                        2,
                    )
                    .grouped("digital"),
                    TopicSeed::new("12153", "Use the workplace communication system", 3, 3),
                    TopicSeed::new("110023", "Present information in report format", 4, 4),
                ],
            ),
            ModuleSeed::from_tagged(
                3,
                "Office Administration",
                vec![
                    TopicSeed::new(
                        "13932",
                        "Prepare and process documents for financial and banking processes",
                        5,
                        5,
                    ),
                    TopicSeed::new("14356", "Maintain an existing filing system", 3, 3),
                    TopicSeed::new(
                        "13929",
                        "Co-ordinate meetings, minor events and travel arrangements",
                        3,
                        4,
                    ),
                    TopicSeed::new("14343", "Manage time productively", 4, 4)
                        .grouped("self-management"),
                    TopicSeed::new("15233", "Compile and manage the schedule of a manager", 3, 4)
                        .grouped("self-management"),
                    TopicSeed::new(
                        "13915",
                        "Demonstrate knowledge of HIV/AIDS in the workplace",
                        4,
                        3,
                    ),
                    TopicSeed::new(
                        "242819",
                        "Outline the legislation governing the workplace",
                        2,
                        2,
                    ),
                ],
            ),
            ModuleSeed::from_tagged(
                4,
                "Customer Service and Teamwork",
                vec![
                    TopicSeed::new("114974", "Apply the basic skills of customer service", 2, 2),
                    TopicSeed::new("13911", "Manage and resolve customer complaints", 4, 4),
                    TopicSeed::new("120375", "Work as a member of a team", 4, 4).grouped("teamwork"),
                    TopicSeed::new("13948", "Participate in team problem solving", 3, 4)
                        .grouped("teamwork"),
                    TopicSeed::new("114589", "Manage conflict in the workplace", 5, 5),
                    TopicSeed::new("12140", "Maintain a safe working environment", 5, 4),
                ],
            ),
            ModuleSeed::from_tagged(
                5,
                "Business Finance",
                vec![
                    TopicSeed::new("119454", "Apply basic bookkeeping principles", 6, 6),
                    TopicSeed::new("117156", "Prepare a budget for a business unit", 4, 4),
                    TopicSeed::new("13990", "Process petty cash transactions", 3, 3)
                        .grouped("cash-control"),
                    TopicSeed::new("14359", "Reconcile creditor statements", 3, 3)
                        .grouped("cash-control"),
                    TopicSeed::new("110006", "Apply procurement procedures", 6, 5),
                ],
            ),
            ModuleSeed::from_tagged(
                6,
                "Business Practice and Projects",
                vec![
                    TopicSeed::new("13945", "Plan, organise and control a small project", 6, 6),
                    TopicSeed::new(
                        "14667",
                        "Apply the principles of ethics in the workplace",
                        4,
                        3,
                    ),
                    TopicSeed::new(
                        "114226",
                        "Interpret basic labour relations legislation",
                        4,
                        4,
                    ),
                    TopicSeed::new("10135", "Work as a project team member", 4, 4)
                        .grouped("project-delivery"),
                    TopicSeed::new("15234", "Analyse the business environment", 4, 4)
                        .grouped("project-delivery"),
                ],
            ),
        ];

        Self::new(modules, TOTAL_CREDITS, REQUIRED_CREDITS)
    }
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::standard()
    }
}
