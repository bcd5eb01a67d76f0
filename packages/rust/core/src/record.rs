//! Record builder: classification + sidecar + headings into export rows.

use lessonmap_shared::{ContentType, Lang, Record, SidecarConfig};

use crate::classify::{Classification, Hierarchy};

/// Minimum `/`-separated segments a Discord URL needs to yield ids.
const MIN_DISCORD_SEGMENTS: usize = 6;

/// Headings extracted from a content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Titles {
    /// Title of an activity or topic (first `# ` line).
    Single(Option<String>),
    /// Sub-titles of a container, Spanish first, then Portuguese.
    Container(Vec<String>),
}

/// Build the records for one content file.
///
/// A container yields one record per sub-title, the first as ES and the
/// second as PT. A container without sub-titles still yields one record,
/// with no title and the language of its file name.
pub fn build_records(
    classification: &Classification,
    sidecar: &SidecarConfig,
    titles: Titles,
) -> Vec<Record> {
    match titles {
        Titles::Single(title) => {
            vec![make_record(classification, sidecar, title, classification.lang)]
        }
        Titles::Container(titles) if titles.is_empty() => {
            vec![make_record(classification, sidecar, None, classification.lang)]
        }
        Titles::Container(titles) => titles
            .into_iter()
            .enumerate()
            .map(|(i, title)| {
                let lang = if i == 0 { Lang::Es } else { Lang::Pt };
                make_record(classification, sidecar, Some(title), Some(lang))
            })
            .collect(),
    }
}

fn make_record(
    classification: &Classification,
    sidecar: &SidecarConfig,
    title: Option<String>,
    lang: Option<Lang>,
) -> Record {
    let Hierarchy {
        track,
        skill,
        module,
    } = classification.hierarchy.clone();
    let discord_url = sidecar.discord_url_for(lang).map(str::to_string);
    let (discord_channel_id, discord_message_id) = discord_ids(discord_url.as_deref());
    let slug = slug(
        &classification.hierarchy,
        title.as_deref(),
        classification.content_type,
        lang,
    );

    Record {
        track,
        skill,
        module,
        title,
        content_type: classification.content_type,
        lang,
        sequence: classification.sequence.clone(),
        learning: sidecar.learning.clone(),
        difficulty: sidecar.difficulty.clone(),
        time: sidecar.time.clone(),
        directions: sidecar.directions.clone(),
        path: classification.relative_path.clone(),
        discord_url,
        discord_channel_id,
        discord_message_id,
        slug,
    }
}

/// Lower-kebab identifier: track, skill, module, title (or type), type and
/// language, skipping absent parts.
pub fn slug(
    hierarchy: &Hierarchy,
    title: Option<&str>,
    content_type: ContentType,
    lang: Option<Lang>,
) -> String {
    let parts = [
        hierarchy.track.as_deref(),
        hierarchy.skill.as_deref(),
        hierarchy.module.as_deref(),
        Some(title.unwrap_or(content_type.as_str())),
        Some(content_type.as_str()),
        lang.map(Lang::as_str),
    ];

    parts
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .replace(' ', "-")
}

/// Channel and message ids from a Discord message link.
///
/// The link, without trailing slashes, is split on `/`; with at least six
/// segments the last two are the channel and message ids. Empty segments
/// yield `None`. Shorter or missing links yield `(None, None)`.
pub fn discord_ids(url: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(url) = url else {
        return (None, None);
    };

    let segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        [.., channel, message] if segments.len() >= MIN_DISCORD_SEGMENTS => {
            (non_empty(channel), non_empty(message))
        }
        _ => (None, None),
    }
}

fn non_empty(segment: &str) -> Option<String> {
    (!segment.is_empty()).then(|| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(content_type: ContentType, lang: Option<Lang>) -> Classification {
        Classification {
            hierarchy: Hierarchy {
                track: Some("Web Dev".into()),
                skill: Some("JS".into()),
                module: Some("Basics".into()),
            },
            content_type,
            lang,
            sequence: Some("01".into()),
            relative_path: "Web Dev/JS/Basics/activities/01_vars_ES.md".into(),
            config_key: "Web Dev/JS/Basics/activities/01_vars".into(),
        }
    }

    fn sidecar() -> SidecarConfig {
        SidecarConfig {
            learning: Some("Variables".into()),
            difficulty: Some("easy".into()),
            time: Some("30".into()),
            directions: None,
            discord_url_es: Some("https://discord.com/channels/111/222/333".into()),
            discord_url_pt: Some("https://discord.com/channels/111/444/555".into()),
        }
    }

    #[test]
    fn activity_record() {
        let c = classification(ContentType::Activity, Some(Lang::Es));
        let records = build_records(&c, &sidecar(), Titles::Single(Some("Variables".into())));

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title.as_deref(), Some("Variables"));
        assert_eq!(r.lang, Some(Lang::Es));
        assert_eq!(r.learning.as_deref(), Some("Variables"));
        assert_eq!(r.time.as_deref(), Some("30"));
        assert_eq!(r.directions, None);
        assert_eq!(r.path, "Web Dev/JS/Basics/activities/01_vars_ES.md");
        assert_eq!(r.discord_url.as_deref(), Some("https://discord.com/channels/111/222/333"));
        assert_eq!(r.discord_channel_id.as_deref(), Some("222"));
        assert_eq!(r.discord_message_id.as_deref(), Some("333"));
        assert_eq!(r.slug, "web-dev-js-basics-variables-activity-es");
    }

    #[test]
    fn portuguese_record_uses_pt_discord_link() {
        let c = classification(ContentType::Activity, Some(Lang::Pt));
        let records = build_records(&c, &sidecar(), Titles::Single(None));
        let r = &records[0];
        assert_eq!(r.discord_url.as_deref(), Some("https://discord.com/channels/111/444/555"));
        assert_eq!(r.discord_message_id.as_deref(), Some("555"));
        assert_eq!(r.slug, "web-dev-js-basics-activity-activity-pt");
    }

    #[test]
    fn container_with_two_titles_yields_two_records() {
        let c = classification(ContentType::Container, None);
        let titles = Titles::Container(vec!["Fundamentos".into(), "Fundamentos PT".into()]);
        let records = build_records(&c, &sidecar(), titles);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lang, Some(Lang::Es));
        assert_eq!(records[1].lang, Some(Lang::Pt));
        assert_eq!(records[0].title.as_deref(), Some("Fundamentos"));
        assert_eq!(records[1].title.as_deref(), Some("Fundamentos PT"));
        assert_ne!(records[0].slug, records[1].slug);

        let mut a = records[0].clone();
        let b = &records[1];
        a.title = b.title.clone();
        a.lang = b.lang;
        a.slug = b.slug.clone();
        a.discord_url = b.discord_url.clone();
        a.discord_channel_id = b.discord_channel_id.clone();
        a.discord_message_id = b.discord_message_id.clone();
        assert_eq!(&a, b);
    }

    #[test]
    fn container_with_one_title_yields_one_record() {
        let c = classification(ContentType::Container, None);
        let records = build_records(&c, &sidecar(), Titles::Container(vec!["Solo".into()]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lang, Some(Lang::Es));
    }

    #[test]
    fn container_without_titles_yields_untitled_record() {
        let c = classification(ContentType::Container, None);
        let records = build_records(&c, &SidecarConfig::default(), Titles::Container(vec![]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, None);
        assert_eq!(records[0].lang, None);
        assert_eq!(records[0].discord_url, None);
        assert_eq!(records[0].slug, "web-dev-js-basics-container-container");
    }

    #[test]
    fn slug_skips_missing_levels() {
        let hierarchy = Hierarchy {
            track: Some("Data".into()),
            skill: None,
            module: None,
        };
        assert_eq!(
            slug(&hierarchy, Some("Análisis de Datos"), ContentType::Container, Some(Lang::Es)),
            "data-análisis-de-datos-container-es"
        );
    }

    #[test]
    fn discord_ids_from_long_url() {
        let (channel, message) = discord_ids(Some("https://discord.com/channels/111/222/333/444"));
        assert_eq!(channel.as_deref(), Some("333"));
        assert_eq!(message.as_deref(), Some("444"));
    }

    #[test]
    fn discord_ids_from_short_url() {
        assert_eq!(discord_ids(Some("https://discord.com/x")), (None, None));
        assert_eq!(discord_ids(Some("")), (None, None));
        assert_eq!(discord_ids(None), (None, None));
    }

    #[test]
    fn discord_ids_ignore_trailing_slash() {
        let (channel, message) = discord_ids(Some("https://discord.com/channels/111/222/333/"));
        assert_eq!(channel.as_deref(), Some("222"));
        assert_eq!(message.as_deref(), Some("333"));

        let (channel, message) = discord_ids(Some("https://discord.com/channels/111//"));
        assert_eq!(channel, None);
        assert_eq!(message, None);
    }

    #[test]
    fn discord_ids_at_six_segments() {
        let (channel, message) = discord_ids(Some("https://discord.com/channels/111/222"));
        assert_eq!(channel.as_deref(), Some("111"));
        assert_eq!(message.as_deref(), Some("222"));
    }
}
