//! Built-in rule sets and the catalog that maps each target to one.
//!
//! | Target | Title | Description | Tags | Failure handling |
//! |--------|-------|-------------|------|------------------|
//! | Marketplace | 10..=140 | 150..=1500 | 10..=13 | repair, else reject |
//! | Instagram | 5..=100 | 50..=2200 | 5..=30 | repair, else default |
//! | Facebook | 5..=120 | 40..=1000 | 1..=10 | repair, else default |
//! | Pinterest | 10..=100 | 50..=500 | 2..=20 | repair, else default |
use crate::error::RuleSetError;
use crate::record::ContentRecord;
use crate::ruleset::{
    CountBounds, FallbackPolicy, FieldScope, LengthBounds, PhraseGroup, RuleSet, StyleRules,
    TagCategory, VocabularyRule,
};
use crate::target::Target;

/// One [`RuleSet`] per [`Target`].
///
/// The catalog is immutable once built and safe to share between threads
/// without synchronization.
///
/// ```rust
/// use rules::{Catalog, Target};
///
/// let catalog = Catalog::builtin();
/// catalog.validate().expect("built-in rules are consistent");
/// assert_eq!(catalog.get(Target::Marketplace).tags.min_count, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    marketplace: RuleSet,
    instagram: RuleSet,
    facebook: RuleSet,
    pinterest: RuleSet,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            marketplace: marketplace_rules(),
            instagram: instagram_rules(),
            facebook: facebook_rules(),
            pinterest: pinterest_rules(),
        }
    }

    pub fn get(&self, target: Target) -> &RuleSet {
        match target {
            Target::Marketplace => &self.marketplace,
            Target::Instagram => &self.instagram,
            Target::Facebook => &self.facebook,
            Target::Pinterest => &self.pinterest,
        }
    }

    /// Replaces the rule set for `target`, validating it first.
    pub fn with_rules(mut self, target: Target, rules: RuleSet) -> Result<Self, RuleSetError> {
        rules.validate(target)?;
        let slot = match target {
            Target::Marketplace => &mut self.marketplace,
            Target::Instagram => &mut self.instagram,
            Target::Facebook => &mut self.facebook,
            Target::Pinterest => &mut self.pinterest,
        };
        *slot = rules;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), RuleSetError> {
        for target in Target::ALL {
            self.get(target).validate(target)?;
        }
        Ok(())
    }

    /// The record substituted when content for `target` cannot be used.
    pub fn default_record(&self, target: Target) -> &ContentRecord {
        &self.get(target).default_record
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn marketplace_rules() -> RuleSet {
    RuleSet {
        title: LengthBounds::new(10, 140),
        description: LengthBounds::new(150, 1500),
        tags: CountBounds::new(10, 13),
        max_tag_chars: Some(20),
        max_tag_words: Some(3),
        required_words: Some(VocabularyRule::new(
            FieldScope::Title,
            &["custom", "personalized", "personalised", "handmade", "gift", "unique"],
        )),
        banned_words: Some(VocabularyRule::new(
            FieldScope::Both,
            &["cheapest", "guaranteed", "replica", "knockoff", "best seller"],
        )),
        required_phrase_groups: vec![
            PhraseGroup::new(&["perfect for", "ideal for", "great for"]),
            PhraseGroup::new(&["order now", "shop now", "add to cart", "buy now"]),
        ],
        tag_categories: vec![
            TagCategory::new(
                "product",
                &[
                    "mug", "cup", "shirt", "hoodie", "poster", "print", "sticker", "necklace",
                    "bracelet", "earrings", "tote", "bag", "pillow", "blanket", "candle",
                    "ornament", "frame", "card", "journal", "notebook", "keychain", "decor",
                ],
            ),
            TagCategory::new(
                "occasion",
                &[
                    "gift", "birthday", "christmas", "wedding", "anniversary", "holiday",
                    "mother", "father", "valentine", "graduation", "baby shower",
                    "housewarming", "retirement",
                ],
            ),
            TagCategory::new(
                "style",
                &[
                    "personalized", "personalised", "custom", "handmade", "vintage",
                    "minimalist", "boho", "rustic", "modern", "cute", "funny", "name",
                    "monogram",
                ],
            ),
        ],
        style: Some(StyleRules {
            emotional_markers: words(&[
                "love", "perfect", "cherish", "joy", "heart", "special", "smile", "memorable",
            ]),
            emotional_suffix: "Perfect for making every moment feel special.".into(),
            cta_markers: words(&["order now", "shop now", "add to cart", "buy now"]),
            cta_suffix: "Order now and make it yours today!".into(),
        }),
        fallback: FallbackPolicy::default(),
        default_record: ContentRecord::new(
            "Personalized Custom Mug - Unique Handmade Gift",
            "This personalized mug is made to order with the name or message of your choice, \
             printed in vivid, long-lasting color on durable ceramic. It is perfect for \
             birthdays, anniversaries and holidays, and it makes every morning coffee feel \
             special. Order now and we will craft it just for you.",
            [
                "personalized mug",
                "custom coffee mug",
                "name mug",
                "birthday gift",
                "gift for her",
                "gift for him",
                "christmas gift",
                "anniversary gift",
                "handmade ceramic",
                "coffee lover",
                "unique mug",
            ],
        ),
    }
}

fn instagram_rules() -> RuleSet {
    RuleSet {
        title: LengthBounds::new(5, 100),
        description: LengthBounds::new(50, 2200),
        tags: CountBounds::new(5, 30),
        max_tag_chars: None,
        max_tag_words: Some(3),
        required_words: None,
        banned_words: Some(VocabularyRule::new(
            FieldScope::Both,
            &["follow for follow", "follow4follow", "like4like", "f4f", "l4l"],
        )),
        required_phrase_groups: Vec::new(),
        tag_categories: Vec::new(),
        style: Some(StyleRules {
            emotional_markers: words(&["love", "obsessed", "joy", "happy", "smile", "heart"]),
            emotional_suffix: "We love how this turned out and hope it makes you smile!".into(),
            cta_markers: words(&["shop now", "link in bio", "tap the link", "order now", "dm us"]),
            cta_suffix: "Tap the link in bio to shop now.".into(),
        }),
        fallback: FallbackPolicy::substituting(),
        default_record: ContentRecord::new(
            "Made with love, just for you",
            "Every piece we make starts with a sketch and a lot of heart. This one is ready to \
             brighten someone's day and make them smile. Tap the link in bio to shop now.",
            [
                "#handmade",
                "#smallbusiness",
                "#giftideas",
                "#personalizedgifts",
                "#shopsmall",
                "#madewithlove",
            ],
        ),
    }
}

fn facebook_rules() -> RuleSet {
    RuleSet {
        title: LengthBounds::new(5, 120),
        description: LengthBounds::new(40, 1000),
        tags: CountBounds::new(1, 10),
        max_tag_chars: None,
        max_tag_words: Some(3),
        required_words: None,
        // Engagement bait is demoted by the platform.
        banned_words: Some(VocabularyRule::new(
            FieldScope::Both,
            &["like and share", "share this post", "tag a friend", "comment yes", "click here"],
        )),
        required_phrase_groups: Vec::new(),
        tag_categories: Vec::new(),
        style: Some(StyleRules {
            emotional_markers: words(&["love", "joy", "happy", "smile", "heart", "special"]),
            emotional_suffix: "We hope it brings a little joy to your day!".into(),
            cta_markers: words(&[
                "shop now",
                "order now",
                "visit our shop",
                "learn more",
                "message us",
            ]),
            cta_suffix: "Visit our shop to order now.".into(),
        }),
        fallback: FallbackPolicy::substituting(),
        default_record: ContentRecord::new(
            "Something special from our workshop",
            "Our newest handmade piece is here, crafted in small batches with care and made to \
             bring a little joy to your home. Visit our shop to order now.",
            ["#handmade", "#shopsmall", "#giftideas"],
        ),
    }
}

fn pinterest_rules() -> RuleSet {
    RuleSet {
        title: LengthBounds::new(10, 100),
        description: LengthBounds::new(50, 500),
        tags: CountBounds::new(2, 20),
        max_tag_chars: None,
        max_tag_words: Some(3),
        required_words: Some(VocabularyRule::new(
            FieldScope::Both,
            &["idea", "inspiration", "diy", "gift", "style", "decor", "how to"],
        )),
        banned_words: None,
        required_phrase_groups: Vec::new(),
        tag_categories: Vec::new(),
        style: Some(StyleRules {
            emotional_markers: words(&["love", "dream", "beautiful", "cozy", "inspire", "joy"]),
            emotional_suffix: "A cozy little detail you will love.".into(),
            cta_markers: words(&["save this", "shop now", "click through", "order now"]),
            cta_suffix: "Save this pin and shop now.".into(),
        }),
        fallback: FallbackPolicy::substituting(),
        default_record: ContentRecord::new(
            "Personalized Gift Ideas for Every Occasion",
            "Looking for gift inspiration? These personalized keepsakes are made to order and \
             designed to be loved for years. Save this pin and shop now to find the perfect \
             match for someone special.",
            [
                "#giftideas",
                "#personalizedgifts",
                "#handmadedecor",
                "#diygifts",
            ],
        ),
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}
