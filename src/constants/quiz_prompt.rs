/// Category taxonomy offered to the model, in prompt order.
pub const QUIZ_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "General Knowledge",
        &[
            "History & Politics",
            "Science & Technology",
            "World Cultures & Traditions",
        ],
    ),
    (
        "Entertainment",
        &["Movies & TV Shows", "Music & Concerts", "Celebrity Trivia"],
    ),
    (
        "Sports",
        &[
            "Team Sports (e.g. Soccer, Football, Basketball)",
            "Individual Sports (e.g. Tennis, Golf, Athletics)",
            "Extreme/Adventure Sports",
        ],
    ),
    (
        "History",
        &[
            "Ancient Civilizations",
            "Medieval & Renaissance",
            "Modern & Contemporary Events",
        ],
    ),
    (
        "Science & Nature",
        &["Biology & Ecology", "Chemistry & Physics", "Space & Astronomy"],
    ),
    (
        "Geography",
        &[
            "World Capitals & Countries",
            "Physical Geography (mountains, rivers, oceans)",
            "Famous Landmarks & Natural Wonders",
        ],
    ),
    (
        "Pop Culture & Media",
        &[
            "Social Media Trends & Viral Memes",
            "Internet Culture & Viral Challenges",
            "Celebrity Gossip & Reality TV",
        ],
    ),
    (
        "Education & Learning",
        &[
            "Academic Subjects",
            "Professional Development",
            "Research & Studies",
        ],
    ),
];

/// Web pages are classified against the first seven categories only.
pub const WEB_TAXONOMY_LEN: usize = 7;

pub const EASY_INSTRUCTION: &str =
    "Create straightforward questions that test basic understanding and recall of main concepts.";

pub const MEDIUM_INSTRUCTION: &str = "Create moderately challenging questions that require understanding relationships between concepts and some analysis.";

pub const HARD_INSTRUCTION: &str = "Create very hard questions that require deep understanding, critical thinking, and connections across the text.";

pub const FORMAT_RULES: &str = "Each question should have 4 different options, and only one of them should be correct.
The options should be unambiguous.
Each option should begin with a letter followed by a period and a space (e.g., \"a. option\").
The question should also briefly mention the general topic of the text so that it can be understood in isolation.
Each question should not give hints to answer the other questions.";

pub const TAXONOMY_INSTRUCTION: &str =
    "Categorize the quiz content by selecting the most appropriate category and subcategory from this list:";

pub const JSON_ONLY_INSTRUCTION: &str = "respond with JSON only, no markdown or descriptions.";

pub const JSON_EXAMPLE: &str = r#"example JSON format you should absolutely follow:
{"topic": "a title fits the topic of the text",
 "category": "one of the main categories from the list",
 "subcategory": "the appropriate subcategory from the list",
 "questions":
  [
    {
      "question": "text of the question",
      "options": ["a. 1st option", "b. 2nd option", "c. 3rd option", "d. 4th option"],
      "right_option": "c"
    }
  ]
}
"right_option" is the letter of the right option ("a" for the first, "b" for the second, etc.)."#;
