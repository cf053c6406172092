//! Option schemas and prompt skeletons for every content kind
//!
//! Every option is a closed enum. Parsing an unknown value (or an
//! unknown option name) is an `InvalidOption` error, never a silent
//! fallback to the default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use log::{debug, trace};

use crate::error::Error;
use crate::request::PromptPair;
use crate::ContentKind;

pub const HASHTAGS_ON: &str = "Include 2-3 relevant hashtags.";
pub const HASHTAGS_OFF: &str = "Do not include hashtags.";
pub const POST_CHARACTER_LIMIT: usize = 280;

/// Declares a closed option enum with its wire names, default and
/// `FromStr` that rejects anything outside the set.
macro_rules! closed_option
{ (
    $(#[$meta:meta])*
    $name:ident, $option:literal, default = $default:ident,
    { $($variant:ident => $wire:literal),+ $(,)? }
  ) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize
    )]
    pub enum $name
    {   $( #[serde(rename = $wire)] $variant ),+
    }

    impl $name
    {   /// Option name used in errors and `(name, value)` pairs
        pub const OPTION: &'static str = $option;
        pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

        pub fn as_str(self) -> &'static str
        {   match self
            {   $( $name::$variant => $wire ),+
            }
        }
    }

    impl Default for $name
    {   fn default() -> Self
        {   $name::$default
        }
    }

    impl fmt::Display for $name
    {   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {   f.write_str(self.as_str())
        }
    }

    impl FromStr for $name
    {   type Err = Error;

        fn from_str(raw: &str) -> Result<Self, Self::Err>
        {   match raw.trim()
            {   $( $wire => Ok($name::$variant), )+
                _ => Err(Error::InvalidOption
                  {   option: $option.to_string()
                    , value: raw.to_string()
                  })
            }
        }
    }
  };
}

// ===== Article =====

closed_option!
{ /// Writing tone of a blog post
  Tone, "tone", default = Professional,
  { Professional => "professional"
  , Casual => "casual"
  , Humorous => "humorous"
  , Formal => "formal"
  , Enthusiastic => "enthusiastic"
  }
}

closed_option!
{ /// Reader group a blog post is written for
  Audience, "audience", default = General,
  { General => "general"
  , Technical => "technical"
  , Business => "business"
  , Academic => "academic"
  , Beginners => "beginners"
  }
}

closed_option!
{ /// Blog post length bucket
  Length, "length", default = Medium,
  { Short => "short"
  , Medium => "medium"
  , Long => "long"
  , Detailed => "detailed"
  }
}

impl Length
{   /// Approximate word count asked of the model
    pub fn word_target(self) -> u32
    {   match self
        {   Length::Short => 300
          , Length::Medium => 600
          , Length::Long => 1000
          , Length::Detailed => 1500
        }
    }
}

// ===== Short video script =====

closed_option!
{ /// Script running time
  ScriptDuration, "duration", default = Thirty,
  { Fifteen => "15"
  , Thirty => "30"
  , Sixty => "60"
  }
}

impl ScriptDuration
{   pub fn seconds(self) -> u32
    {   match self
        {   ScriptDuration::Fifteen => 15
          , ScriptDuration::Thirty => 30
          , ScriptDuration::Sixty => 60
        }
    }
}

closed_option!
{ ScriptStyle, "style", default = Trendy,
  { Trendy => "trendy"
  , Educational => "educational"
  , Storytelling => "storytelling"
  , Comedy => "comedy"
  , Tutorial => "tutorial"
  }
}

closed_option!
{ ScriptTarget, "target", default = GenZ,
  { GenZ => "gen-z"
  , Millennials => "millennials"
  , Professionals => "professionals"
  , Students => "students"
  , General => "general"
  }
}

// ===== Micro-post =====

closed_option!
{ PostStyle, "style", default = Viral,
  { Viral => "viral"
  , Professional => "professional"
  , Humorous => "humorous"
  , Controversial => "controversial"
  , Informative => "informative"
  }
}

closed_option!
{ /// What a micro-post is optimized for
  PostGoal, "goal", default = Engagement,
  { Engagement => "engagement"
  , Clicks => "clicks"
  , Followers => "followers"
  , Awareness => "awareness"
  , Discussion => "discussion"
  }
}

// ===== Option sets =====

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize
)]
#[serde(default, deny_unknown_fields)]
pub struct ArticleOptions
{   pub tone: Tone
  , pub audience: Audience
  , pub length: Length
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize
)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptOptions
{   pub duration: ScriptDuration
  , pub style: ScriptStyle
  , pub target: ScriptTarget
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostOptions
{   pub style: PostStyle
  , pub goal: PostGoal
  , pub hashtags: bool
}

impl Default for PostOptions
{   fn default() -> Self
    {   PostOptions
        {   style: PostStyle::default()
          , goal: PostGoal::default()
          , hashtags: true
        }
    }
}

/// Options for one content kind.
/// Serialized with a `kind` tag matching `ContentKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OptionSet
{   Article(ArticleOptions)
  , ShortVideoScript(ScriptOptions)
  , MicroPost(PostOptions)
}

impl OptionSet
{   /// Default options for a kind
    pub fn defaults(kind: ContentKind) -> Self
    {   match kind
        {   ContentKind::Article => {
              OptionSet::Article(ArticleOptions::default())
            }
          , ContentKind::ShortVideoScript => {
              OptionSet::ShortVideoScript(ScriptOptions::default())
            }
          , ContentKind::MicroPost => {
              OptionSet::MicroPost(PostOptions::default())
            }
        }
    }

    /// Build from raw `(name, value)` pairs, as submitted by a form.
    /// Missing names keep their defaults; unknown names or values fail.
    pub fn from_pairs<I, K, V>(
      kind: ContentKind
    , pairs: I
    ) -> Result<Self, Error>
    where
      I: IntoIterator<Item = (K, V)>
    , K: AsRef<str>
    , V: AsRef<str>
    {   let mut set = OptionSet::defaults(kind);
        for (name, value) in pairs
        {   set.apply(name.as_ref(), value.as_ref())?;
        }
        trace!("Parsed option set: {:?}", set);
        Ok(set)
    }

    fn apply(&mut self, name: &str, value: &str) -> Result<(), Error>
    {   match (self, name.trim())
        {   (OptionSet::Article(o), Tone::OPTION) => {
              o.tone = value.parse()?;
            }
          , (OptionSet::Article(o), Audience::OPTION) => {
              o.audience = value.parse()?;
            }
          , (OptionSet::Article(o), Length::OPTION) => {
              o.length = value.parse()?;
            }
          , (OptionSet::ShortVideoScript(o), ScriptDuration::OPTION) => {
              o.duration = value.parse()?;
            }
          , (OptionSet::ShortVideoScript(o), ScriptStyle::OPTION) => {
              o.style = value.parse()?;
            }
          , (OptionSet::ShortVideoScript(o), ScriptTarget::OPTION) => {
              o.target = value.parse()?;
            }
          , (OptionSet::MicroPost(o), PostStyle::OPTION) => {
              o.style = value.parse()?;
            }
          , (OptionSet::MicroPost(o), PostGoal::OPTION) => {
              o.goal = value.parse()?;
            }
          , (OptionSet::MicroPost(o), "hashtags") => {
              o.hashtags = parse_flag("hashtags", value)?;
            }
          , (_, unknown) => {
              return Err(Error::InvalidOption
              {   option: unknown.to_string()
                , value: value.to_string()
              });
            }
        }
        Ok(())
    }

    /// Kind these options belong to
    pub fn kind(&self) -> ContentKind
    {   match self
        {   OptionSet::Article(_) => ContentKind::Article
          , OptionSet::ShortVideoScript(_) => {
              ContentKind::ShortVideoScript
            }
          , OptionSet::MicroPost(_) => ContentKind::MicroPost
        }
    }
}

fn parse_flag(option: &str, raw: &str) -> Result<bool, Error>
{   match raw.trim()
    {   "true" | "yes" | "on" => Ok(true)
      , "false" | "no" | "off" => Ok(false)
      , _ => Err(Error::InvalidOption
        {   option: option.to_string()
          , value: raw.to_string()
        })
    }
}

/// Renders the instruction pair for a kind.
/// Pure: identical inputs always give an identical `PromptPair`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplateEngine;

impl PromptTemplateEngine
{   pub fn new() -> Self
    {   PromptTemplateEngine
    }

    pub fn render(
      &self
    , kind: ContentKind
    , options: &OptionSet
    , user_intent: &str
    ) -> Result<PromptPair, Error>
    {   if options.kind() != kind
        {   debug!(
              "Option set for {:?} passed to a {:?} render"
            , options.kind()
            , kind
            );
            return Err(Error::OptionKindMismatch
            {   expected: kind
              , found: options.kind()
            });
        }

        let intent = user_intent.trim();
        if intent.is_empty()
        {   debug!("Rejecting empty intent for {:?}", kind);
            return Err(Error::EmptyIntent);
        }

        Ok(PromptPair::new(
          system_instruction(options)
        , format!("Write a {} about: {}", kind.subject_label(), intent)
        ))
    }
}

/// Skeleton table, one arm per kind
fn system_instruction(options: &OptionSet) -> String
{   match options
    {   OptionSet::Article(o) => format!(
          "You are a professional blog writer. \
           Write in a {} tone for a {} audience. \
           Create a well-structured blog post of approximately {} words \
           using markdown format. \
           Include headings, paragraphs, and bullet points where appropriate."
        , o.tone
        , o.audience
        , o.length.word_target()
        )
      , OptionSet::ShortVideoScript(o) => format!(
          "You are a professional TikTok script writer. \
           Create a {}-second {} TikTok script targeting {} audience. \
           Include hooks, transitions, music suggestions, and visual directions. \
           Format the script with clear sections for VISUAL, AUDIO, and TEXT ON SCREEN."
        , o.duration.seconds()
        , o.style
        , o.target
        )
      , OptionSet::MicroPost(o) => format!(
          "You are a Twitter expert who creates {} tweets optimized for {}. \
           {} Keep the tweet within {} characters. \
           Make it attention-grabbing and shareable."
        , o.style
        , o.goal
        , if o.hashtags { HASHTAGS_ON } else { HASHTAGS_OFF }
        , POST_CHARACTER_LIMIT
        )
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn engine() -> PromptTemplateEngine
    {   PromptTemplateEngine::new()
    }

    #[test]
    fn article_scenario()
    {   let options = OptionSet::from_pairs(
          ContentKind::Article
        , [("tone", "casual"), ("audience", "beginners"), ("length", "short")]
        ).unwrap();
        let pair = engine()
          .render(ContentKind::Article, &options, "home composting")
          .unwrap();

        assert!(pair.system_instruction().contains("casual tone"));
        assert!(pair.system_instruction().contains("beginners audience"));
        assert!(pair.system_instruction().contains("300 words"));
        assert!(pair.system_instruction().contains("markdown"));
        assert_eq!(
          pair.user_instruction()
        , "Write a blog post about: home composting"
        );
    }

    #[test]
    fn length_targets()
    {   let targets: Vec<u32>
          = Length::ALL.iter().map(|l| l.word_target()).collect();
        assert_eq!(targets, vec![300, 600, 1000, 1500]);
    }

    #[test]
    fn script_duration_is_literal()
    {   let options = OptionSet::from_pairs(
          ContentKind::ShortVideoScript
        , [("duration", "60")]
        ).unwrap();
        let pair = engine()
          .render(ContentKind::ShortVideoScript, &options, "latte art")
          .unwrap();

        let system = pair.system_instruction();
        assert!(system.contains("60-second trendy TikTok script"));
        assert!(system.contains("targeting gen-z audience"));
        assert!(system.contains("VISUAL, AUDIO, and TEXT ON SCREEN"));
        assert_eq!(
          pair.user_instruction()
        , "Write a TikTok script about: latte art"
        );
    }

    #[test]
    fn post_hashtag_fragments()
    {   let off = OptionSet::from_pairs(
          ContentKind::MicroPost
        , [("hashtags", "false"), ("goal", "discussion")]
        ).unwrap();
        let pair = engine()
          .render(ContentKind::MicroPost, &off, "remote work")
          .unwrap();
        let system = pair.system_instruction();
        assert!(!system.contains(HASHTAGS_ON));
        assert!(system.contains(HASHTAGS_OFF));
        assert!(system.contains("280 characters"));
        assert!(system.contains("optimized for discussion"));

        let on = OptionSet::defaults(ContentKind::MicroPost);
        let pair = engine()
          .render(ContentKind::MicroPost, &on, "remote work")
          .unwrap();
        assert!(pair.system_instruction().contains(HASHTAGS_ON));
        assert!(!pair.system_instruction().contains(HASHTAGS_OFF));
    }

    #[test]
    fn rendering_is_deterministic()
    {   for kind in ContentKind::ALL
        {   let options = OptionSet::defaults(kind);
            let a = engine().render(kind, &options, "  tides ").unwrap();
            let b = engine().render(kind, &options, "  tides ").unwrap();
            assert_eq!(a, b);
            assert!(a.user_instruction().ends_with("about: tides"));
        }
    }

    #[test]
    fn unknown_values_are_rejected()
    {   let err = OptionSet::from_pairs(
          ContentKind::Article
        , [("length", "epic")]
        ).unwrap_err();
        assert_eq!(
          err
        , Error::InvalidOption
          {   option: "length".to_string()
            , value: "epic".to_string()
          }
        );

        let err = OptionSet::from_pairs(
          ContentKind::ShortVideoScript
        , [("duration", "45")]
        ).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);

        let err = OptionSet::from_pairs(
          ContentKind::MicroPost
        , [("hashtags", "maybe")]
        ).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn unknown_names_are_rejected()
    {   // "tone" belongs to articles only
        let err = OptionSet::from_pairs(
          ContentKind::MicroPost
        , [("tone", "casual")]
        ).unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }

    #[test]
    fn empty_intent_and_mismatch_fail()
    {   let options = OptionSet::defaults(ContentKind::Article);
        assert_eq!(
          engine().render(ContentKind::Article, &options, " \t\n")
        , Err(Error::EmptyIntent)
        );
        assert_eq!(
          engine().render(ContentKind::MicroPost, &options, "x")
        , Err(Error::OptionKindMismatch
          {   expected: ContentKind::MicroPost
            , found: ContentKind::Article
          })
        );
    }

    #[test]
    fn serde_uses_wire_names()
    {   let set: OptionSet = serde_json::from_str(
          r#"{"kind":"short-video-script","duration":"15","target":"students"}"#
        ).unwrap();
        assert_eq!(
          set
        , OptionSet::ShortVideoScript(ScriptOptions
          {   duration: ScriptDuration::Fifteen
            , style: ScriptStyle::Trendy
            , target: ScriptTarget::Students
          })
        );

        let bad = serde_json::from_str::<OptionSet>(
          r#"{"kind":"article","tone":"sarcastic"}"#
        );
        assert!(bad.is_err());
    }
}
