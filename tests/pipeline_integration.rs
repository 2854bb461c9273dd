use contentgate::{
    Catalog, ContentRecord, ErrorKind, Pipeline, Target, ValidationOutcome, Violation,
};

const MUG_DESCRIPTION: &str = "This custom mug is printed with your own name or message on \
glossy ceramic that holds up to daily use. It is perfect for birthdays and holidays and makes \
a thoughtful keepsake you will love. Order now to get yours!";

const MUG_TAGS: &str = "mug,gift,personalized,coffee mug,birthday gift,christmas gift,custom name,\
ceramic cup,gift for mom,handmade";

fn mug_json() -> String {
    serde_json::json!({
        "title": "Custom Mug",
        "description": MUG_DESCRIPTION,
        "tags": MUG_TAGS,
    })
    .to_string()
}

#[test]
fn short_listing_is_rejected_with_every_violation() {
    let pipeline = Pipeline::builtin();
    let outcome = pipeline.process_output(
        r#"{"title":"x","description":"short","tags":"a,b"}"#,
        Target::Marketplace,
    );

    let ValidationOutcome::Invalid {
        kind,
        violations,
        diagnostic,
    } = outcome
    else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(kind, ErrorKind::ValidationError);
    assert!(violations.iter().any(|v| matches!(
        v,
        Violation::DescriptionLength { len: 5, min: 150, .. }
    )));
    assert!(violations.iter().any(|v| matches!(
        v,
        Violation::TagCount { count: 2, min: 10, .. }
    )));

    let listed = diagnostic.context()["violations"].as_array().unwrap();
    assert_eq!(listed.len(), violations.len());
    assert_eq!(diagnostic.context()["stage"], "schema");
}

#[test]
fn prose_wrapped_listing_is_valid() {
    let pipeline = Pipeline::builtin();
    let input = format!("Sure! {}  Hope that helps!", mug_json());
    let outcome = pipeline.process_output(&input, Target::Marketplace);

    let ValidationOutcome::Valid(record) = outcome else {
        panic!("expected valid listing, got {outcome:?}");
    };
    assert_eq!(record.title, "Custom Mug");
    assert_eq!(record.description, MUG_DESCRIPTION);
    assert_eq!(record.tags.len(), 10);
    assert_eq!(record.tags[3], "coffee mug");
    assert_eq!(
        record.render(Target::Marketplace).tags,
        MUG_TAGS.replace(',', ", ")
    );
}

#[test]
fn brace_in_title_is_rejected_even_when_all_else_passes() {
    let pipeline = Pipeline::builtin();
    let input = serde_json::json!({
        "title": "Custom {Name} Mug",
        "description": MUG_DESCRIPTION,
        "tags": MUG_TAGS,
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    assert_eq!(outcome.error_kind(), Some(ErrorKind::ValidationError));
    assert_eq!(
        outcome.violations(),
        [Violation::JsonSyntaxInField {
            field: contentgate::Field::Title
        }]
    );
}

#[test]
fn every_default_record_passes_its_own_target() {
    let pipeline = Pipeline::builtin();
    for target in Target::ALL {
        let default = pipeline.default_record(target).clone();
        let input = serde_json::to_string(&default).unwrap();
        let outcome = pipeline.process_output(&input, target);
        assert_eq!(outcome, ValidationOutcome::Valid(default), "{target}");
    }
}

#[test]
fn overlong_title_is_repaired_not_surfaced() {
    let pipeline = Pipeline::builtin();
    let input = serde_json::json!({
        "title": format!("Custom Mug {}", "with a very long story ".repeat(10)),
        "description": MUG_DESCRIPTION,
        "tags": MUG_TAGS,
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    let record = outcome.record().expect("repaired record");
    assert!(outcome.is_valid());
    assert_eq!(record.title.chars().count(), 140);
    assert!(record.title.starts_with("Custom Mug with a very long story"));
    assert!(record.title.ends_with("..."));
}

#[test]
fn instagram_post_gets_hashtags_and_style() {
    let pipeline = Pipeline::builtin();
    let input = r##"Here is your post:
{"title":"New spring prints","description":"Our spring botanical prints just landed in the shop, printed on thick matte paper.","tags":["botanical art","#PrintShop","wall art","spring decor","plant lover","wall art"]}"##;

    let outcome = pipeline.process_output(input, Target::Instagram);
    let ValidationOutcome::Valid(record) = outcome else {
        panic!("expected valid post, got {outcome:?}");
    };
    assert_eq!(
        record.tags,
        ["#botanicalart", "#PrintShop", "#wallart", "#springdecor", "#plantlover"]
    );
    let style = pipeline.rules(Target::Instagram).style.clone().unwrap();
    assert!(record.description.ends_with(&style.cta_suffix));
    assert!(record.description.contains(&style.emotional_suffix));
    assert_eq!(
        record.render(Target::Instagram).tags,
        "#botanicalart #PrintShop #wallart #springdecor #plantlover"
    );
}

#[test]
fn missing_benefit_phrase_is_appended() {
    let pipeline = Pipeline::builtin();
    let description = MUG_DESCRIPTION.replace("It is perfect for", "It is a perfect pick for");
    let input = serde_json::json!({
        "title": "Custom Mug",
        "description": description,
        "tags": MUG_TAGS,
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    let ValidationOutcome::Valid(record) = outcome else {
        panic!("expected repaired listing, got {outcome:?}");
    };
    let style = pipeline.rules(Target::Marketplace).style.clone().unwrap();
    assert!(record.description.starts_with(&description));
    assert!(record.description.ends_with(&style.emotional_suffix));
    assert!(record.description.chars().count() <= 1500);
}

#[test]
fn commas_inside_array_tags_do_not_leak_into_hashtags() {
    let pipeline = Pipeline::builtin();
    let input = r#"{"title":"New spring prints","description":"Our spring botanical prints just landed in the shop, printed on thick matte paper.","tags":["a,b","c","d","e","f"]}"#;

    let outcome = pipeline.process_output(input, Target::Instagram);
    let ValidationOutcome::Valid(record) = outcome else {
        panic!("expected valid post, got {outcome:?}");
    };
    assert_eq!(record.render(Target::Instagram).tags, "#ab #c #d #e #f");
}

#[test]
fn commas_inside_array_tags_become_spaces_for_listings() {
    let pipeline = Pipeline::builtin();
    let mut tags: Vec<&str> = MUG_TAGS.split(',').collect();
    let mom = tags.iter().position(|t| *t == "gift for mom").unwrap();
    tags[mom] = "mom, dad";
    let input = serde_json::json!({
        "title": "Custom Mug",
        "description": MUG_DESCRIPTION,
        "tags": tags,
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    let ValidationOutcome::Valid(record) = outcome else {
        panic!("expected valid listing, got {outcome:?}");
    };
    assert_eq!(record.tags.len(), 10);
    assert_eq!(record.tags[mom], "mom dad");
    let rendered = record.render(Target::Marketplace).tags;
    let reread = contentgate::coerce_tags(&serde_json::Value::String(rendered)).unwrap();
    assert_eq!(reread, record.tags);
}

#[test]
fn short_description_is_replaced_for_social_post() {
    let pipeline = Pipeline::builtin();
    let input = r#"{"title":"Weekend market","description":"See you there!","tags":"market, handmade"}"#;
    let outcome = pipeline.process_output(input, Target::Facebook);
    let record = outcome.record().expect("record");
    assert!(outcome.is_valid());
    assert_eq!(
        record.description,
        pipeline.default_record(Target::Facebook).description
    );
    assert_eq!(record.tags, ["#market", "#handmade"]);
}

#[test]
fn social_target_substitutes_default_on_unrepairable_rules() {
    let pipeline = Pipeline::builtin();
    let input = r#"{"title":"Hi","description":"Follow4follow for more cute mugs, we love our followers and you can shop now.","tags":"mug"}"#;

    let outcome = pipeline.process_output(input, Target::Instagram);
    let ValidationOutcome::Substituted { record, diagnostic } = outcome else {
        panic!("expected substitution, got {outcome:?}");
    };
    assert_eq!(&record, pipeline.default_record(Target::Instagram));
    assert_eq!(diagnostic.error_code(), "VALIDATION_ERROR");
}

#[test]
fn marketplace_rejects_banned_words() {
    let pipeline = Pipeline::builtin();
    let description = format!("{MUG_DESCRIPTION} Guaranteed cheapest mug online.");
    let input = serde_json::json!({
        "title": "Custom Mug",
        "description": description,
        "tags": MUG_TAGS,
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    let words: Vec<&str> = outcome
        .violations()
        .iter()
        .filter_map(|v| match v {
            Violation::BannedWord { word, .. } => Some(word.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(words, ["cheapest", "guaranteed"]);
}

#[test]
fn missing_tag_category_is_named() {
    let pipeline = Pipeline::builtin();
    // No occasion tag anywhere.
    let input = serde_json::json!({
        "title": "Custom Mug",
        "description": MUG_DESCRIPTION,
        "tags": "mug,cup,poster,print,personalized,custom name,handmade,vintage,boho,rustic",
    })
    .to_string();

    let outcome = pipeline.process_output(&input, Target::Marketplace);
    assert_eq!(
        outcome.violations(),
        [Violation::MissingTagCategory {
            category: "occasion".into()
        }]
    );
}

#[test]
fn config_override_changes_rules() {
    let yaml = r##"
version: "1.0"
targets:
  pinterest:
    title: { min_len: 10, max_len: 40 }
    description: { min_len: 50, max_len: 500 }
    tags: { min_count: 1, max_count: 3 }
    fallback:
      on_unrepairable: reject
    default_record:
      title: "Cozy gift ideas"
      description: "Simple handmade gift ideas for cozy evenings and slow mornings."
      tags: ["#giftideas"]
"##;
    let config = contentgate::PipelineConfig::from_yaml(yaml).unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();

    let record = ContentRecord::new(
        "Cozy gift ideas for winter",
        "Simple handmade gift ideas for cozy evenings and slow mornings.",
        ["#a", "#b", "#c", "#d", "#e"],
    );
    let outcome = pipeline.process_output(&serde_json::to_string(&record).unwrap(), Target::Pinterest);
    let record = outcome.record().expect("repaired record");
    assert_eq!(record.tags, ["#a", "#b", "#c"]);
    assert_eq!(
        Catalog::builtin().get(Target::Pinterest).tags.max_count,
        20,
        "builtin rules are untouched"
    );
}
