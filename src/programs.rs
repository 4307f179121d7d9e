//! Program catalog: maps human-entered program names to internal codes.
//!
//! Names are matched case-insensitively in Russian, Kazakh, and English. An
//! operator can add names or whole programs from a TOML file:
//!
//! ```toml
//! [[program]]
//! code = "finance"
//! names = ["corporate finance", "корпоративные финансы"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Built-in name to code table, covering bachelor, master, and doctorate programs.
const BUILTIN: &[(&str, &str)] = &[
    // bachelor, ru
    ("бухгалтерский учёт", "accounting"),
    ("бухгалтерский учет", "accounting"),
    ("прикладная лингвистика", "appliedLinguistics"),
    ("экономика и наука о данных", "economicsDataScience"),
    ("финансы", "finance"),
    ("гостеприимство", "hospitality"),
    ("международная журналистика", "internationalJournalism"),
    ("международное право", "internationalLaw"),
    ("международные отношения", "internationalRelations"),
    ("it", "it"),
    ("ит", "it"),
    ("юриспруденция", "jurisprudence"),
    ("менеджмент", "management"),
    ("маркетинг", "marketing"),
    ("психология", "psychology"),
    ("туризм", "tourism"),
    ("переводческое дело", "translation"),
    // bachelor, kk
    ("бухгалтерлік есеп", "accounting"),
    ("қолданбалы лингвистика", "appliedLinguistics"),
    ("экономика және деректер ғылымы", "economicsDataScience"),
    ("қаржы", "finance"),
    ("қонақжайлылық", "hospitality"),
    ("халықаралық журналистика", "internationalJournalism"),
    ("халықаралық құқық", "internationalLaw"),
    ("халықаралық қатынастар", "internationalRelations"),
    ("құқықтану", "jurisprudence"),
    ("аударма ісі", "translation"),
    // bachelor, en
    ("accounting", "accounting"),
    ("applied linguistics", "appliedLinguistics"),
    ("economics and data science", "economicsDataScience"),
    ("finance", "finance"),
    ("hospitality", "hospitality"),
    ("international journalism", "internationalJournalism"),
    ("international law", "internationalLaw"),
    ("international relations", "internationalRelations"),
    ("law", "jurisprudence"),
    ("management", "management"),
    ("marketing", "marketing"),
    ("psychology", "psychology"),
    ("tourism", "tourism"),
    ("translation studies", "translation"),
    // master, ru
    ("политология и международные отношения", "politicalInternationalRelations"),
    ("конкурентное право", "competitionLaw"),
    ("консультативная психология", "consultingPsychology"),
    ("экономика", "economics"),
    ("право интеллектуальной собственности и бизнеса", "intellectualPropertyLaw"),
    ("право it", "itLaw"),
    ("право ит", "itLaw"),
    // master, kk
    ("саясаттану және халықаралық қатынастар", "politicalInternationalRelations"),
    ("бәсекелестік құқық", "competitionLaw"),
    ("консультативті психология", "consultingPsychology"),
    ("зияткерлік меншік және бизнес құқық", "intellectualPropertyLaw"),
    ("құқық it", "itLaw"),
    // master, en
    ("political science and international relations", "politicalInternationalRelations"),
    ("competition law", "competitionLaw"),
    ("counselling psychology", "consultingPsychology"),
    ("economics", "economics"),
    ("intellectual property and business law", "intellectualPropertyLaw"),
    ("it law", "itLaw"),
    // doctorate
    ("право", "law"),
    ("phd по экономике", "phdEconomics"),
    ("құқық", "law"),
    ("экономика саласындағы phd", "phdEconomics"),
    ("phd in law", "law"),
    ("phd in economics", "phdEconomics"),
];

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    program: Vec<ProgramEntry>,
}

#[derive(Debug, Deserialize)]
struct ProgramEntry {
    code: String,
    #[serde(default)]
    names: Vec<String>,
}

/// Ordered name to code table. Lookup order follows insertion order so that
/// resolved code lists are stable.
#[derive(Debug, Clone)]
pub struct ProgramCatalog {
    entries: Vec<(String, String)>,
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProgramCatalog {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        }
    }

    /// An empty catalog. Every lookup falls through to the raw input.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Map `name` to `code`. A name already present is re-pointed.
    pub fn insert(&mut self, name: &str, code: &str) {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = code.to_string(),
            None => self.entries.push((name, code.to_string())),
        }
    }

    /// Merge entries from TOML text. Each program's code is also registered
    /// as a name for itself.
    pub fn extend_from_toml(&mut self, text: &str) -> Result<()> {
        let file: CatalogFile = toml::from_str(text)
            .map_err(|e| Error::Config(format!("invalid program catalog: {e}")))?;
        for entry in file.program {
            let code = entry.code.trim();
            if code.is_empty() {
                return Err(Error::Config("program catalog entry has an empty code".into()));
            }
            self.insert(code, code);
            for name in &entry.names {
                self.insert(name, code);
            }
        }
        Ok(())
    }

    /// Built-in catalog extended from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mut catalog = Self::builtin();
        catalog.extend_from_toml(&text)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            entries = catalog.entries.len(),
            "loaded program catalog"
        );
        Ok(catalog)
    }

    /// Resolve a human-entered program name to candidate codes.
    ///
    /// Exact name match first, then every name that contains the input or is
    /// contained in it. When nothing matches, the input itself is taken to
    /// be a code.
    pub fn resolve(&self, input: &str) -> Vec<String> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut codes: Vec<String> = Vec::new();
        if let Some((_, code)) = self.entries.iter().find(|(name, _)| *name == needle) {
            codes.push(code.clone());
        }
        for (name, code) in &self.entries {
            if (name.contains(&needle) || needle.contains(name.as_str())) && !codes.contains(code)
            {
                codes.push(code.clone());
            }
        }

        if codes.is_empty() {
            codes.push(needle);
        }
        codes
    }

    /// Does a ticket's program list contain any code `input` resolves to?
    pub fn matches(&self, programs: &[String], input: &str) -> bool {
        let wanted = self.resolve(input);
        programs
            .iter()
            .any(|p| wanted.iter().any(|code| code.eq_ignore_ascii_case(p)))
    }
}
