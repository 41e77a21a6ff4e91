use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    En,
    Ru,
}

impl Lang {
    pub fn label(&self) -> &'static str {
        match self {
            Lang::En => "English",
            Lang::Ru => "Русский",
        }
    }

    pub fn all() -> &'static [Lang] {
        &[Lang::En, Lang::Ru]
    }
}

static CURRENT_LANG: AtomicU8 = AtomicU8::new(0); // 0=En (default)

pub fn lang() -> Lang {
    match CURRENT_LANG.load(Ordering::Relaxed) {
        1 => Lang::Ru,
        _ => Lang::En,
    }
}

pub fn set_lang(l: Lang) {
    CURRENT_LANG.store(
        match l {
            Lang::En => 0,
            Lang::Ru => 1,
        },
        Ordering::Relaxed,
    );
}

/// Translate a key to the current language.
pub fn t(key: &str) -> &'static str {
    let ru = lang() == Lang::Ru;
    match key {
        // ── Click-to-play overlay ───────────────────────────
        "overlay.click_to_play" => if ru { "Нажмите, чтобы играть" } else { "Click to play" },
        "overlay.move" => if ru { "Движение: WASD" } else { "Move: WASD" },
        "overlay.jump" => if ru { "Прыжок: ПРОБЕЛ" } else { "Jump: SPACE" },
        "overlay.look" => if ru { "Обзор: МЫШЬ" } else { "Look: MOUSE" },
        "overlay.release" => if ru { "Esc: отпустить мышь" } else { "Esc: release mouse" },

        // ── Debug panel ─────────────────────────────────────
        "debug.title" => if ru { "Журнал" } else { "Debug" },
        "debug.reload" => if ru { "Перезагрузить данные" } else { "Reload data" },
        "debug.source" => if ru { "Источник" } else { "Source" },
        "debug.position" => if ru { "Позиция" } else { "Position" },
        "debug.velocity" => if ru { "Скорость" } else { "Velocity" },
        "debug.language" => if ru { "Язык" } else { "Language" },
        "debug.gl_unavailable" => if ru { "OpenGL недоступен, программная отрисовка" } else { "OpenGL unavailable, software rendering" },
        "debug.loading" => if ru { "Загрузка данных..." } else { "Loading data..." },

        // ── Fallback ────────────────────────────────────────
        _ => "???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_fallback() {
        set_lang(Lang::En);
        assert_eq!(t("overlay.click_to_play"), "Click to play");
        assert_eq!(t("overlay.move"), "Move: WASD");
        assert_eq!(t("no.such.key"), "???");
        set_lang(Lang::Ru);
        assert_eq!(lang(), Lang::Ru);
        assert_ne!(t("overlay.click_to_play"), "Click to play");
        set_lang(Lang::En);
    }
}
