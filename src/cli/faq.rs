//! Frequently asked questions shown by `nexus faq`.

pub(super) struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub(super) const FAQS: &[Faq] = &[
    Faq {
        question: "¿Cómo enciendo todas las luces de mi hogar?",
        answer: "Usa `nexus lights on`, o escribe en el chat 'Enciende todas las luces' o 'Prende las luces'.",
    },
    Faq {
        question: "¿Cómo ajusto la temperatura de mi hogar?",
        answer: "Usa `nexus climate set <grados>` (entre 16 y 30 °C) y `nexus climate ac` para el aire acondicionado.",
    },
    Faq {
        question: "¿Cómo activo el sistema de seguridad?",
        answer: "Usa `nexus security`, o escribe en el chat 'Activa la seguridad'. Al activarla, las puertas se cierran.",
    },
    Faq {
        question: "¿Qué es el modo noche y cómo funciona?",
        answer: "El modo noche deja encendida solo la luz del dormitorio. Actívalo con `nexus night-mode` o diciendo 'Activa el modo noche'.",
    },
    Faq {
        question: "¿Cómo veo el consumo energético de mi hogar?",
        answer: "`nexus status` muestra el resumen de energía. También puedes preguntar '¿Cuánto consumo energético hay hoy?'.",
    },
    Faq {
        question: "¿Puedo controlar dispositivos específicos?",
        answer: "Sí: luces por habitación con `nexus lights toggle <habitación>` y dispositivos con `nexus device <tv|speakers|smart_plugs>`.",
    },
];

pub(super) fn format_faqs() -> String {
    FAQS.iter()
        .map(|faq| format!("{}\n  {}", faq.question, faq.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}
