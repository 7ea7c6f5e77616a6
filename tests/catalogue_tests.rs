use rollout_tool::catalogue::{REQUIRED_CREDITS, TOTAL_CREDITS};
use rollout_tool::{CatalogueError, Curriculum, ModuleSeed, TopicBlock, TopicSeed};
use std::io::Write;
use tempfile::NamedTempFile;

fn small_curriculum(topics: Vec<TopicSeed>, total: u32) -> Curriculum {
    Curriculum::new(vec![ModuleSeed::from_tagged(1, "Only", topics)], total, total)
}

#[test]
fn standard_catalogue_is_valid() {
    let curriculum = Curriculum::standard();
    curriculum.validate().unwrap();
    assert_eq!(curriculum.total_credits, TOTAL_CREDITS);
    assert_eq!(curriculum.required_credits, REQUIRED_CREDITS);
    assert_eq!(curriculum.computed_credits(), 140);
    assert_eq!(curriculum.modules.len(), 6);
    let numbers: Vec<u32> = curriculum.modules.iter().map(|m| m.module_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn standard_module_credit_totals() {
    let curriculum = Curriculum::standard();
    let totals: Vec<u32> = curriculum
        .modules
        .iter()
        .map(ModuleSeed::total_credits)
        .collect();
    assert_eq!(totals, vec![27, 22, 24, 23, 22, 22]);
}

#[test]
fn module_one_groups_literacy_and_numeracy() {
    let curriculum = Curriculum::standard();
    let module = &curriculum.modules[0];
    assert_eq!(module.blocks.len(), 4);

    match &module.blocks[1] {
        TopicBlock::CoScheduled { key, topics } => {
            assert_eq!(key, "literacy");
            let ids: Vec<&str> = topics.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, vec!["119457", "119465"]);
        }
        other => panic!("expected literacy group, got {other:?}"),
    }
    assert_eq!(module.blocks[2].group_key(), Some("numeracy"));
    assert_eq!(module.blocks[2].duration_days(), 3);
    assert!(matches!(module.blocks[0], TopicBlock::Singleton(_)));
}

#[test]
fn topic_lookup_by_id() {
    let curriculum = Curriculum::standard();
    let topic = curriculum.topic("242819").unwrap();
    assert_eq!(topic.credits, 2);
    assert!(curriculum.topic("000000").is_none());
}

#[test]
fn from_tagged_collects_split_group_at_first_member() {
    let module = ModuleSeed::from_tagged(
        1,
        "Mixed",
        vec![
            TopicSeed::new("a", "A", 1, 2).grouped("g"),
            TopicSeed::new("b", "B", 1, 2),
            TopicSeed::new("c", "C", 1, 5).grouped("g"),
        ],
    );
    assert_eq!(module.blocks.len(), 2);
    assert_eq!(module.blocks[0].group_key(), Some("g"));
    assert_eq!(module.blocks[0].topics().len(), 2);
    // the leader sets the block length
    assert_eq!(module.blocks[0].duration_days(), 2);
    let order: Vec<&str> = module.topics().map(|t| t.id.as_str()).collect();
    assert_eq!(order, vec!["a", "c", "b"]);
}

#[test]
fn rejects_zero_duration() {
    let curriculum = small_curriculum(vec![TopicSeed::new("z", "Zero", 4, 0)], 4);
    assert_eq!(
        curriculum.validate(),
        Err(CatalogueError::ZeroDuration("z".to_string()))
    );
}

#[test]
fn rejects_duplicate_topic_ids() {
    let curriculum = small_curriculum(
        vec![TopicSeed::new("x", "X", 2, 1), TopicSeed::new("x", "X again", 2, 1)],
        4,
    );
    assert_eq!(
        curriculum.validate(),
        Err(CatalogueError::DuplicateTopic("x".to_string()))
    );
}

#[test]
fn rejects_credit_mismatch() {
    let curriculum = small_curriculum(vec![TopicSeed::new("x", "X", 2, 1)], 10);
    assert_eq!(
        curriculum.validate(),
        Err(CatalogueError::CreditMismatch {
            declared: 10,
            computed: 2
        })
    );
}

#[test]
fn rejects_required_above_total() {
    let mut curriculum = small_curriculum(vec![TopicSeed::new("x", "X", 2, 1)], 2);
    curriculum.required_credits = 3;
    assert_eq!(
        curriculum.validate(),
        Err(CatalogueError::RequiredExceedsTotal {
            required: 3,
            total: 2
        })
    );
}

#[test]
fn rejects_module_ordering_problems() {
    let module = |n| ModuleSeed::from_tagged(n, "M", vec![TopicSeed::new(&format!("t{n}"), "T", 1, 1)]);

    let gap = Curriculum::new(vec![module(1), module(3)], 2, 2);
    assert_eq!(
        gap.validate(),
        Err(CatalogueError::Gap {
            previous: 1,
            current: 3
        })
    );

    let backwards = Curriculum::new(vec![module(2), module(1)], 2, 2);
    assert_eq!(
        backwards.validate(),
        Err(CatalogueError::OutOfOrder {
            previous: 2,
            current: 1
        })
    );

    let mut twice = module(1);
    twice.blocks = vec![TopicBlock::Singleton(TopicSeed::new("other", "T", 1, 1))];
    let duplicate = Curriculum::new(vec![module(1), twice], 2, 2);
    assert_eq!(duplicate.validate(), Err(CatalogueError::DuplicateModule(1)));
}

#[test]
fn rejects_empty_group() {
    let curriculum = Curriculum::new(
        vec![ModuleSeed::new(
            1,
            "M",
            vec![TopicBlock::CoScheduled {
                key: "empty".to_string(),
                topics: Vec::new(),
            }],
        )],
        0,
        0,
    );
    assert_eq!(
        curriculum.validate(),
        Err(CatalogueError::EmptyGroup("empty".to_string()))
    );
}

#[test]
fn curriculum_json_uses_flat_topic_lists() {
    let curriculum = Curriculum::standard();
    let value = serde_json::to_value(&curriculum).unwrap();
    let first = &value["modules"][0];
    assert_eq!(first["moduleNumber"], 1);
    assert_eq!(first["topics"].as_array().unwrap().len(), 6);
    assert_eq!(first["topics"][1]["groupKey"], "literacy");
    assert!(first["topics"][0].get("groupKey").is_none());

    let back: Curriculum = serde_json::from_value(value).unwrap();
    assert_eq!(back, curriculum);
}

#[test]
fn load_validates_file_contents() {
    let mut file = NamedTempFile::new().unwrap();
    let json = r#"{
        "modules": [
            {"moduleNumber": 1, "name": "Short", "topics": [
                {"id": "a", "title": "A", "credits": 3, "durationDays": 2},
                {"id": "b", "title": "B", "credits": 2, "durationDays": 1, "groupKey": "pair"},
                {"id": "c", "title": "C", "credits": 1, "durationDays": 1, "groupKey": "pair"}
            ]}
        ],
        "totalCredits": 6,
        "requiredCredits": 5
    }"#;
    file.write_all(json.as_bytes()).unwrap();

    let curriculum = Curriculum::load(file.path()).unwrap();
    assert_eq!(curriculum.modules[0].blocks.len(), 2);
    assert_eq!(curriculum.computed_credits(), 6);

    let mut bad = NamedTempFile::new().unwrap();
    bad.write_all(json.replace("\"totalCredits\": 6", "\"totalCredits\": 7").as_bytes())
        .unwrap();
    assert!(matches!(
        Curriculum::load(bad.path()),
        Err(CatalogueError::CreditMismatch { .. })
    ));

    assert!(matches!(
        Curriculum::load("/nonexistent/curriculum.json"),
        Err(CatalogueError::Io(_))
    ));
}
