//! Translation tables for agent-facing and API display strings.
//!
//! Keys are dotted strings (`thought.broke`, `memory.woke_up`). Values may
//! contain `{name}` placeholders filled by [`translate_with`]. A key missing
//! from a table resolves to the key itself so a gap shows up in output
//! instead of failing a tick.

use crate::enums::{ActionType, Language};

/// English table.
const EN: &[(&str, &str)] = &[
    // Rule brain thoughts
    ("thought.too_tired", "I am too tired. I need to sleep."),
    ("thought.broke", "I am broke. I need to work hard."),
    ("thought.chill", "I have some money and energy. I will chill at the park."),
    ("thought.none", "No thought recorded yet."),
    ("reflection.maxim", "Health is wealth."),
    ("values.default", "Survival first, health is most important."),
    // Memory notes
    ("memory.forced_sleep", "It is late at night. I went to sleep."),
    ("memory.woke_up", "I woke up."),
    ("memory.failed_move", "Failed to move to ({x}, {y})"),
    ("memory.collapsed", "I collapsed from exhaustion."),
    ("memory.decision_failed", "I could not make up my mind ({reason}), so I idled."),
    ("memory.thought", "Thought: {thought}"),
    ("memory.action", "Action: {action}"),
    ("memory.event", "[EVENT: {kind}] {description}"),
    ("memory.reflection", "Reflection: {text}"),
    ("status.no_memory", "No memories yet."),
    // Perception
    ("perception.time", "It is currently {time}. The weather is {weather}."),
    ("perception.location", "You are standing at ({x}, {y}), which is {terrain}."),
    (
        "perception.stats",
        "You feel: Health={health}, Energy={energy}, Sanity={sanity}. You have ${wealth}.",
    ),
    ("perception.nearby", "Nearby you see: {entities}."),
    ("perception.entity", "A {kind} (ID: {id}) at ({x}, {y})"),
    ("perception.alone", "You don't see anyone else nearby."),
    // Actions
    ("action.WORK_996", "Working hard (996 schedule)"),
    ("action.WORK_965", "Working (9-5 schedule)"),
    ("action.REST_PARK", "Resting at park"),
    ("action.CONSUME_ENT", "Consuming entertainment"),
    ("action.SLEEP", "Sleeping"),
    ("action.IDLE", "Idling"),
    // API messages
    ("message.agent_created", "Agent {id} created"),
    ("message.event_injected", "Event delivered to {count} agent(s)"),
    ("message.world_reset", "World reset"),
    ("message.advanced_ticks", "Advanced {ticks} tick(s)"),
    ("message.action_set", "Agent {id} is now {action}"),
];

/// Simplified Chinese table.
const ZH: &[(&str, &str)] = &[
    ("thought.too_tired", "我太累了，我需要睡觉。"),
    ("thought.broke", "我没钱了，我需要努力工作。"),
    ("thought.chill", "我有一些钱和精力，我要去公园放松一下。"),
    ("thought.none", "还没有记录任何想法。"),
    ("reflection.maxim", "健康就是财富。"),
    ("values.default", "生存第一，健康最重要。"),
    ("memory.forced_sleep", "夜深了，我去睡觉了。"),
    ("memory.woke_up", "我醒了。"),
    ("memory.failed_move", "无法移动到 ({x}, {y})"),
    ("memory.collapsed", "我因精疲力竭而昏倒了。"),
    ("memory.decision_failed", "我拿不定主意（{reason}），只好发呆。"),
    ("memory.thought", "想法：{thought}"),
    ("memory.action", "行动：{action}"),
    ("memory.event", "[事件：{kind}] {description}"),
    ("memory.reflection", "反思：{text}"),
    ("status.no_memory", "还没有记忆。"),
    ("perception.time", "现在是{time}。天气{weather}。"),
    ("perception.location", "你站在 ({x}, {y})，这里是{terrain}。"),
    (
        "perception.stats",
        "你感觉：健康={health}，精力={energy}，理智={sanity}。你有 ${wealth}。",
    ),
    ("perception.nearby", "你附近看到：{entities}。"),
    ("perception.entity", "一个{kind}（ID：{id}）在 ({x}, {y})"),
    ("perception.alone", "你附近没有其他人。"),
    ("action.WORK_996", "努力工作（996）"),
    ("action.WORK_965", "正常工作（朝九晚五）"),
    ("action.REST_PARK", "在公园休息"),
    ("action.CONSUME_ENT", "娱乐消费"),
    ("action.SLEEP", "睡觉"),
    ("action.IDLE", "发呆"),
    ("message.agent_created", "已创建智能体 {id}"),
    ("message.event_injected", "事件已送达 {count} 个智能体"),
    ("message.world_reset", "世界已重置"),
    ("message.advanced_ticks", "已推进 {ticks} 个时间步"),
    ("message.action_set", "智能体 {id} 现在的行动是 {action}"),
];

const fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::En => EN,
        Language::Zh => ZH,
    }
}

/// Look up `key` in the table for `language`.
///
/// Falls back to the English entry, then to the key itself.
pub fn translate<'a>(language: Language, key: &'a str) -> &'a str {
    let lookup = |entries: &'static [(&'static str, &'static str)]| {
        entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
    };
    lookup(table(language)).or_else(|| lookup(EN)).unwrap_or(key)
}

/// Look up `key` and substitute `{name}` placeholders from `args`.
pub fn translate_with(language: Language, key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(translate(language, key).to_owned(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

impl ActionType {
    /// Localized display name, e.g. "Resting at park".
    pub fn display_name(self, language: Language) -> &'static str {
        match self {
            Self::Work996 => translate(language, "action.WORK_996"),
            Self::Work965 => translate(language, "action.WORK_965"),
            Self::RestPark => translate(language, "action.REST_PARK"),
            Self::ConsumeEnt => translate(language, "action.CONSUME_ENT"),
            Self::Sleep => translate(language, "action.SLEEP"),
            Self::Idle => translate(language, "action.IDLE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_english_key_has_a_chinese_entry() {
        for (key, _) in EN {
            assert!(
                ZH.iter().any(|(candidate, _)| candidate == key),
                "missing zh entry for {key}"
            );
        }
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        assert_eq!(translate(Language::Zh, "no.such.key"), "no.such.key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let text = translate_with(Language::En, "memory.failed_move", &[("x", "4"), ("y", "-1")]);
        assert_eq!(text, "Failed to move to (4, -1)");
    }

    #[test]
    fn action_display_names_are_localized() {
        assert_eq!(ActionType::RestPark.display_name(Language::En), "Resting at park");
        assert_eq!(ActionType::Sleep.display_name(Language::Zh), "睡觉");
    }
}
