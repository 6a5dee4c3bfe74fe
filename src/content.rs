//! Static quiz content. The core never mutates questions; it only needs the
//! ordinal -> question id mapping and the deck length. Display metadata
//! (shape, color) is carried through untouched for the frontend.

use crate::types::{OptionId, QuestionId};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    Diamond,
    Circle,
    Square,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: OptionId,
    pub text: String,
    pub shape: Shape,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<QuizOption>,
}

/// Ordered, immutable question deck for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Question> {
        self.questions.get(index as usize)
    }

    /// Stable question id for a 0-based ordinal, if it exists.
    pub fn question_id(&self, index: u32) -> Option<QuestionId> {
        self.get(index).map(|q| q.id)
    }

    /// Load a deck from a JSON file, falling back to the built-in deck when
    /// the path is absent or the file is unreadable/malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<Question>>(&raw) {
                Ok(questions) if !questions.is_empty() => {
                    tracing::info!("Loaded {} questions from {}", questions.len(), path.display());
                    Self { questions }
                }
                Ok(_) => {
                    tracing::warn!("Question file {} is empty, using built-in deck", path.display());
                    Self::builtin()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse question file {}: {}, using built-in deck", path.display(), e);
                    Self::builtin()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read question file {}: {}, using built-in deck", path.display(), e);
                Self::builtin()
            }
        }
    }

    /// The hotel marketing survey deck shipped with the app.
    pub fn builtin() -> Self {
        let questions = vec![
            question(1, "Possui anúncios no Google ADS?", [
                "Não utilizo Google Ads para meu hotel ou pousada",
                "Utilizo, inclusive investimento em pesquisas com o nome do próprio hotel",
                "Utilizo, mas não com o nome do próprio hotel",
                "Aumenta a visibilidade do hotel",
            ]),
            question(2, "Possui website com motor de reservas?", [
                "Possuo website, mas sem motor de reservas",
                "Possuo website com links para motor de reservas",
                "Não utilizo motor de reservas",
                "Não possuo website",
            ]),
            question(3, "Se tem motor de reservas, tem link do Google Hotel?", [
                "Eu não sei o que é Google Hotel",
                "Possuo link do Google Hotel",
                "Possuo link do Google Hotel, inclusive sendo divulgado no Google Ads",
                "Apenas por boca a boca",
            ]),
            question(4, "Você mantém seu hotel disponível na Booking.com durante alta temporada, ou foca em reservas diretas?", [
                "Diminuo minha disponibilidade na Booking.com, mas não fecho",
                "Eu não altero a disponibilidade na Booking.com",
                "Reservo apenas de forma direta",
                "Eu fecho minha disponibilidade na Booking.com",
            ]),
            question(5, "Você utiliza Chatbot?", [
                "Eu utilizo chatbot para atendimento rápido",
                "Prefiro atendimento 100% humano",
                "Eu não utilizo chatbot",
                "Eu utilizo chatbot apenas fora do horário comercial",
            ]),
            question(6, "Você tem um campo de promoções em seu website, durante alta temporada?", [
                "Sim, mantenho promoções no website para que fique comercial e atrativo",
                "Não, eu prefiro não abordar promoções ou qualquer oferta no website",
                "Sim, eu tenho uma área de pacotes, mas sem dar desconto",
                "Não faço promoções",
            ]),
            question(7, "Qual a frequência de postagens?", [
                "Sem frequência definida",
                "Mensalmente",
                "Uma vez por semana",
                "Diariamente",
            ]),
            question(8, "Como você divulga serviços extras?", [
                "Apenas por e-mail",
                "Apenas em folhetos",
                "Não divulgo serviços extras",
                "Através das redes sociais",
            ]),
            question(9, "Qual a sua estratégia de reservas?", [
                "Apenas reservas por telefone",
                "Uso apenas plataformas de terceiros",
                "Não tenho estratégia definida",
                "Foco em reservas diretas",
            ]),
            question(10, "Qual a sua opinião sobre Chatbots?", [
                "Acho desnecessário",
                "Prefiro atendimento humano",
                "Acho útil para atendimento",
                "Não tenho opinião formada",
            ]),
        ];
        Self { questions }
    }
}

/// Fixed option styling: opt1..opt4 map to the four Kahoot-style shapes.
const OPTION_STYLE: [(Shape, &str); 4] = [
    (Shape::Triangle, "red"),
    (Shape::Diamond, "blue"),
    (Shape::Circle, "yellow"),
    (Shape::Square, "green"),
];

fn question(id: QuestionId, text: &str, options: [&str; 4]) -> Question {
    let options = options
        .iter()
        .zip(OPTION_STYLE.iter())
        .enumerate()
        .map(|(i, (text, (shape, color)))| QuizOption {
            id: format!("opt{}", i + 1),
            text: (*text).to_string(),
            shape: *shape,
            color: (*color).to_string(),
        })
        .collect();

    Question {
        id,
        question: text.to_string(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_deck_has_ten_questions_with_four_options() {
        let deck = QuestionSet::builtin();
        assert_eq!(deck.len(), 10);
        for index in 0..10 {
            let q = deck.get(index).unwrap();
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.options[0].id, "opt1");
            assert_eq!(q.options[3].id, "opt4");
        }
        assert_eq!(deck.question_id(0), Some(1));
        assert_eq!(deck.question_id(9), Some(10));
        assert_eq!(deck.question_id(10), None);
    }

    #[test]
    fn load_falls_back_to_builtin_on_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let deck = QuestionSet::load(Some(file.path()));
        assert_eq!(deck.len(), 10);
    }

    #[test]
    fn load_reads_custom_deck() {
        let deck_json = serde_json::json!([
            {
                "id": 42,
                "question": "Custom?",
                "options": [
                    { "id": "opt1", "text": "a", "shape": "triangle", "color": "red" },
                    { "id": "opt2", "text": "b", "shape": "diamond", "color": "blue" },
                    { "id": "opt3", "text": "c", "shape": "circle", "color": "yellow" },
                    { "id": "opt4", "text": "d", "shape": "square", "color": "green" }
                ]
            }
        ]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", deck_json).unwrap();

        let deck = QuestionSet::load(Some(file.path()));
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.question_id(0), Some(42));
    }
}
