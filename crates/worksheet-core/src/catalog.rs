//! Built-in exercises of the Unit 2 practice worksheet.

use crate::model::{AnswerKey, Choice, Exercise, ExerciseItem, GradingRule, ItemId};

const GRANNY_DORIS_SCRIPT: &str = "\
My granny, Doris, told me a very interesting story. When she was twelve years old, she and her \
brother, Marty, who was ten, wanted to be explorers. They decided to go into the forest near their \
home. They didn't tell their parents because their parents always told them not to go into the \
forest. They said that it was big and dangerous.

They took some food and ran into the forest. Their parents were both very busy and they didn't see \
the children go. At first, my granny says it was exciting and they saw lots of different animals and \
plants. They stopped and ate their food by a river when they got hungry. They had a lot of fun. Time \
went very fast and it got dark. My granny said she felt worried when it got dark because they \
couldn't find the way home. Then, there was a thunderstorm. Granny's brother was frightened of the \
lightning, but Granny liked it. They got very wet. They walked for a long time. There was a lot of \
mud. They climbed up a big tree because it was difficult to walk in the mud. It was dry in the tree \
because it had a lot of leaves, but they were cold.

Then they heard their names. It was their father's voice. He found them alive and well, and they \
went home. Her brother said he didn't want to be an explorer anymore, but my granny said she liked \
the excitement and wanted more adventures!";

const HELICOPTER_TEXT: &str = "\
Last Sunday, I went in a helicopter for the first time. I went with my mother and the pilot. My \
mother went in a helicopter with her father once when she was a child and really liked it. The \
helicopter ride was a birthday present for me and I was very excited.

We left the house to go for the helicopter ride. It was a sunny day, but there were a few clouds. My \
mother was worried about the clouds. The helicopter pilot said the weather was OK though and so I \
didn't worry.

It was amazing to be so high in the sky. I loved it. I looked out of the window and down at the land \
below. It was beautiful up in the sky. The sound of the helicopter was quite loud, but I liked it. \
After about half an hour, it became very cloudy. The clouds became very dark. Then I heard the sound \
of thunder and I felt very frightened. We saw lightning twice. We decided to go back down to land. \
The storm got louder and louder and the rain made it difficult to see. My mum didn't look happy.

The pilot was very good. He got us down to the ground. We ran through the rain into a building and \
drank some hot chocolate. The storm lasted for a while, but then the sun came out. The pilot took us \
back up into the sky and we had a wonderful helicopter ride. I was a very happy birthday boy!";

fn item(id: ItemId, prompt: &str, answer: AnswerKey) -> ExerciseItem {
    ExerciseItem {
        id,
        prompt: prompt.to_string(),
        hint: None,
        options: Vec::new(),
        answer,
    }
}

fn true_false(id: ItemId, prompt: &str, answer: bool) -> ExerciseItem {
    item(id, prompt, AnswerKey::Bool(answer))
}

fn two_way(id: ItemId, question: &str, a: &str, b: &str, answer: &str) -> ExerciseItem {
    ExerciseItem {
        options: vec![Choice::new("A", a), Choice::new("B", b)],
        ..item(id, question, AnswerKey::Choice(answer.to_string()))
    }
}

fn text(id: ItemId, prompt: &str, answer: &str) -> ExerciseItem {
    item(id, prompt, AnswerKey::Text(answer.to_string()))
}

fn hinted(id: ItemId, hint: &str, prompt: &str, answer: &str) -> ExerciseItem {
    ExerciseItem {
        hint: Some(hint.to_string()),
        ..text(id, prompt, answer)
    }
}

fn pick(id: ItemId, prompt: &str, answer: &str) -> ExerciseItem {
    item(id, prompt, AnswerKey::Choice(answer.to_string()))
}

/// Task 1: true/false questions on Granny Doris's story.
pub fn granny_doris() -> Exercise {
    Exercise {
        id: "granny-doris".into(),
        title: "Task 1: Granny Doris's Story".into(),
        section: "Reading".into(),
        instructions: "Read the transcript and decide if the sentences are True (T) or False (F)."
            .into(),
        context: "Topic: Reading comprehension (Granny Doris's story)".into(),
        passage: Some(GRANNY_DORIS_SCRIPT.into()),
        example: Some("Marty was twelve years old when the story happened. False (He was ten).".into()),
        rule: GradingRule::TrueFalse,
        pool: Vec::new(),
        items: vec![
            true_false(1, "Doris' parents told the children not to go into the forest.", true),
            true_false(2, "They ate their food by some plants.", false),
            true_false(3, "There was a thunderstorm but no lightning.", false),
            true_false(4, "Their parents found them.", false),
            true_false(5, "Doris still wanted to be an explorer, but Marty didn't.", true),
        ],
    }
}

/// Task 2: choose A or B about Joe's helicopter ride.
pub fn helicopter() -> Exercise {
    Exercise {
        id: "helicopter".into(),
        title: "Task 2: My Adventure in a Helicopter".into(),
        section: "Reading".into(),
        instructions: "Read about Joe's adventure and choose the correct option (A or B).".into(),
        context: "Topic: Reading comprehension (helicopter adventure)".into(),
        passage: Some(HELICOPTER_TEXT.into()),
        example: Some(
            "A Joe went in a helicopter last Sunday. / B Joe went in a helicopter last Saturday. -> A"
                .into(),
        ),
        rule: GradingRule::SingleChoice,
        pool: Vec::new(),
        items: vec![
            two_way(
                1,
                "How many times had Joe been in a helicopter before?",
                "It was Joe's second time in a helicopter.",
                "It was Joe's mother's second time in a helicopter.",
                "B",
            ),
            two_way(
                2,
                "What was the weather like when they started?",
                "There were some clouds in the sky when they left.",
                "There weren't any clouds in the sky when they left.",
                "A",
            ),
            two_way(
                3,
                "How did Joe feel at the start?",
                "Joe felt frightened at the beginning of the helicopter ride.",
                "Joe didn't feel frightened at the beginning of the helicopter ride.",
                "B",
            ),
            two_way(
                4,
                "How long did the bad weather last?",
                "The storm lasted for a day.",
                "The storm lasted for a while.",
                "B",
            ),
            two_way(
                5,
                "What happened after the storm?",
                "They went back up in the helicopter after the storm.",
                "They went back up in the helicopter the next day.",
                "A",
            ),
        ],
    }
}

/// Task 3: rewrite sentences in the past simple negative.
pub fn past_negatives() -> Exercise {
    Exercise {
        id: "past-negatives".into(),
        title: "Task 3: Past Simple Negatives".into(),
        section: "Grammar".into(),
        instructions: "Write the sentences in the negative form. Use contractions (e.g. didn't)."
            .into(),
        context: "Topic: Past simple negatives".into(),
        passage: None,
        example: Some(
            "There was a rainbow after the storm. -> There wasn't a rainbow after the storm.".into(),
        ),
        rule: GradingRule::FreeText {
            expand_contractions: true,
        },
        pool: Vec::new(),
        items: vec![
            text(1, "Trees blew down in the tornado.", "Trees didn't blow down in the tornado"),
            text(2, "It was a hot day yesterday.", "It wasn't a hot day yesterday"),
            text(3, "She enjoyed the rain.", "She didn't enjoy the rain"),
            text(4, "There were storms every day.", "There weren't storms every day"),
            text(5, "The boy learned to take photos.", "The boy didn't learn to take photos"),
            text(6, "We needed rain for the garden.", "We didn't need rain for the garden"),
        ],
    }
}

/// Task 4: write questions for the given answers.
pub fn questions() -> Exercise {
    Exercise {
        id: "questions".into(),
        title: "Task 4: Writing Questions".into(),
        section: "Grammar".into(),
        instructions: "Write questions for the answers supplied using the word in brackets.".into(),
        context: "Topic: Past simple questions".into(),
        passage: None,
        example: Some(
            "I stayed on the mountain for a week. (How long?) -> How long did you stay on the mountain?"
                .into(),
        ),
        rule: GradingRule::FreeText {
            expand_contractions: false,
        },
        pool: Vec::new(),
        items: vec![
            hinted(1, "Where?", "I slept in a tent.", "Where did you sleep?"),
            hinted(2, "How?", "I went by car.", "How did you go?"),
            hinted(3, "Who?", "I saw my friend.", "Who did you see?"),
            hinted(4, "What?", "I ate pizza.", "What did you eat?"),
            hinted(
                5,
                "Why?",
                "I was tired because I went to bed late.",
                "Why were you tired?",
            ),
            hinted(6, "How long?", "I walked for two hours.", "How long did you walk for?"),
        ],
    }
}

/// Task 5: complete sentences with weather words from the box.
pub fn weather_words() -> Exercise {
    Exercise {
        id: "weather-words".into(),
        title: "Task 5: Weather Vocabulary".into(),
        section: "Vocabulary".into(),
        instructions: "Complete the sentences with one of the words from the box.".into(),
        context: "Topic: Weather Vocabulary".into(),
        passage: None,
        example: None,
        rule: GradingRule::PickList,
        pool: vec![
            Choice::word("cloudy").as_example(),
            Choice::word("wet"),
            Choice::word("windy"),
            Choice::word("snowing"),
            Choice::word("stormy"),
            Choice::word("sunny"),
            Choice::word("hailing"),
        ],
        items: vec![
            pick(1, "The land is so white when it's ____.", "snowing"),
            pick(2, "It's ____! The pieces of ice are so big – it hurts!", "hailing"),
            pick(3, "It was so ____ my hat flew off.", "windy"),
            pick(4, "It was ____ and muddy after the rain.", "wet"),
            pick(
                5,
                "On holiday, we had a few ____ nights with lightning and thunder.",
                "stormy",
            ),
            pick(6, "On ____ days we went swimming.", "sunny"),
        ],
    }
}

/// Task 6: match definitions with natural-disaster nouns.
pub fn definitions() -> Exercise {
    Exercise {
        id: "definitions".into(),
        title: "Task 6: Definitions".into(),
        section: "Vocabulary".into(),
        instructions: "Match the definitions (1–6) with the correct nouns (a–g).".into(),
        context: "Topic: Extreme weather and natural disaster nouns".into(),
        passage: None,
        example: Some("The earth moving and breaking. -> earthquake (d)".into()),
        rule: GradingRule::PickList,
        pool: vec![
            Choice::new("a", "tornado"),
            Choice::new("b", "avalanche"),
            Choice::new("c", "flood"),
            Choice::new("d", "earthquake").as_example(),
            Choice::new("e", "lightning"),
            Choice::new("f", "tsunami"),
            Choice::new("g", "hurricane"),
        ],
        items: vec![
            pick(1, "Wind that travels in a circle.", "a"),
            pick(2, "A huge wave of water.", "f"),
            pick(3, "Electricity in the sky.", "e"),
            pick(4, "Too much water.", "c"),
            pick(5, "Very strong wind.", "g"),
            pick(6, "Snow falling down a mountain.", "b"),
        ],
    }
}

/// Task 7: choose a response for each statement.
pub fn responses() -> Exercise {
    Exercise {
        id: "responses".into(),
        title: "Task 7: Responses".into(),
        section: "Communication".into(),
        instructions: "Choose the correct response to match each statement or question.".into(),
        context: "Topic: Responding to news and apologies".into(),
        passage: None,
        example: None,
        rule: GradingRule::PickList,
        pool: vec![
            Choice::word("Sorry about that."),
            Choice::word("Poor you."),
            Choice::word("It really doesn't matter."),
            Choice::word("That's a real shame."),
            Choice::word("Oh, bad luck!"),
            Choice::word("Oh no!"),
            Choice::word("Never mind.").as_example(),
        ],
        items: vec![
            pick(1, "He's here and he's angry.", "Oh no!"),
            pick(
                2,
                "The bus to the station was late and I missed my train.",
                "That's a real shame.",
            ),
            pick(3, "I am so sorry. I broke your cup.", "It really doesn't matter."),
            pick(4, "I failed the test.", "Oh, bad luck!"),
            pick(5, "I feel so sick. I can't come to the cinema.", "Poor you."),
            pick(
                6,
                "You didn't ask me before you took my jacket!",
                "Sorry about that.",
            ),
        ],
    }
}

/// Every built-in exercise in worksheet order.
pub fn all() -> Vec<Exercise> {
    vec![
        granny_doris(),
        helicopter(),
        past_negatives(),
        questions(),
        weather_words(),
        definitions(),
        responses(),
    ]
}

/// Look up a built-in exercise by id.
pub fn find(id: &str) -> Option<Exercise> {
    all().into_iter().find(|ex| ex.id == id)
}
