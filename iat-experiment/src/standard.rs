//! The standard six-block test: Bashkir/Russian words against cow/horse
//! pictures.

use iat_core::{Block, Category, Stimulus};

pub const BASHKIR_WORDS: [&str; 9] = [
    "Юрта",
    "Сабантуй",
    "Тюбетейка",
    "Агидель",
    "Урал-Батыр",
    "Бешмет",
    "Кумыс",
    "Курай",
    "Бешбармак",
];

pub const RUSSIAN_WORDS: [&str; 9] = [
    "Шапка-ушанка",
    "Квас",
    "Пельмени",
    "Балалайка",
    "Изба",
    "Илья Муромец",
    "Волга",
    "Масленица",
    "Кокошник",
];

pub const IMAGES_PER_ANIMAL: usize = 8;

pub fn horse_images() -> Vec<String> {
    (1..=IMAGES_PER_ANIMAL)
        .map(|i| format!("./images/horse_{i}.jpg"))
        .collect()
}

pub fn cow_images() -> Vec<String> {
    (1..=IMAGES_PER_ANIMAL)
        .map(|i| format!("./images/cow_{i}.jpg"))
        .collect()
}

/// Word and image stimuli for all four categories.
pub fn stimulus_pool() -> Vec<Stimulus> {
    let words = BASHKIR_WORDS.len() + RUSSIAN_WORDS.len();
    let mut pool = Vec::with_capacity(words + 2 * IMAGES_PER_ANIMAL);
    pool.extend(
        BASHKIR_WORDS
            .iter()
            .enumerate()
            .map(|(i, w)| Stimulus::word(format!("bash_{i}"), Category::Bashkir, *w)),
    );
    pool.extend(
        RUSSIAN_WORDS
            .iter()
            .enumerate()
            .map(|(i, w)| Stimulus::word(format!("rus_{i}"), Category::Russian, *w)),
    );
    pool.extend(
        horse_images()
            .into_iter()
            .enumerate()
            .map(|(i, src)| Stimulus::image(format!("horse_{i}"), Category::Horse, src)),
    );
    pool.extend(
        cow_images()
            .into_iter()
            .enumerate()
            .map(|(i, src)| Stimulus::image(format!("cow_{i}"), Category::Cow, src)),
    );
    pool
}

fn block(
    id: u32,
    title: &str,
    instruction: &str,
    left: &[Category],
    right: &[Category],
    trial_count: usize,
) -> Block {
    Block {
        id,
        title: title.to_string(),
        instruction: instruction.to_string(),
        left_categories: left.to_vec(),
        right_categories: right.to_vec(),
        trial_count,
    }
}

pub fn blocks() -> Vec<Block> {
    use Category::*;
    vec![
        block(
            1,
            "Этап 1: Слова",
            "Запомните слова для каждой категории.\nНажимайте 'E' (слева) для БАШКИРСКИХ слов.\nНажимайте 'I' (справа) для РУССКИХ слов.",
            &[Bashkir],
            &[Russian],
            10,
        ),
        block(
            2,
            "Этап 2: Картинки",
            "Нажимайте 'E' (слева) для КОРОВ.\nНажимайте 'I' (справа) для ЛОШАДЕЙ.",
            &[Cow],
            &[Horse],
            10,
        ),
        block(
            3,
            "Этап 3: Совмещение (Тренировка)",
            "Нажимайте 'E' для БАШКИРЫ или КОРОВЫ.\nНажимайте 'I' для РУССКИЕ или ЛОШАДИ.",
            &[Bashkir, Cow],
            &[Russian, Horse],
            20,
        ),
        block(
            4,
            "Этап 4: Смена сторон (Слова)",
            "ВНИМАНИЕ: Стороны поменялись!\nНажимайте 'E' (слева) для РУССКИХ слов.\nНажимайте 'I' (справа) для БАШКИРСКИХ слов.",
            &[Russian],
            &[Bashkir],
            10,
        ),
        block(
            5,
            "Этап 5: Обратное совмещение",
            "Нажимайте 'E' для РУССКИЕ или КОРОВЫ.\nНажимайте 'I' для БАШКИРЫ или ЛОШАДИ.",
            &[Russian, Cow],
            &[Bashkir, Horse],
            20,
        ),
        block(
            6,
            "Этап 6: Финал",
            "Повторим предыдущее задание.\nНажимайте 'E' для РУССКИЕ или КОРОВЫ.\nНажимайте 'I' для БАШКИРЫ или ЛОШАДИ.",
            &[Russian, Cow],
            &[Bashkir, Horse],
            20,
        ),
    ]
}
