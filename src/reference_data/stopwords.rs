// stopwords.rs - Built-in stop-word tables

use std::collections::HashSet;

/// French stop words.
pub static FRENCH_STOPWORDS: &[&str] = &[
    "alors", "au", "aucuns", "aussi", "autre", "aux", "avant", "avec", "avoir", "bon", "car",
    "ce", "cela", "ces", "ceux", "chaque", "ci", "comme", "comment", "dans", "de", "dedans",
    "dehors", "depuis", "des", "deux", "devrait", "doit", "donc", "dos", "droite", "du", "début",
    "elle", "elles", "en", "encore", "essai", "est", "et", "eu", "eux", "fait", "faites", "fois",
    "font", "force", "haut", "hors", "ici", "il", "ils", "je", "juste", "la", "le", "les",
    "leur", "lui", "là", "ma", "maintenant", "mais", "me", "meme", "mes", "mine", "moi", "moins",
    "mon", "mot", "ne", "ni", "nommés", "nos", "notre", "nous", "nouveaux", "on", "ou", "où",
    "par", "parce", "parole", "pas", "personnes", "peu", "peut", "pièce", "plupart", "pour",
    "pourquoi", "qu", "quand", "que", "quel", "quelle", "quelles", "quels", "qui", "sa", "sans",
    "se", "ses", "seulement", "si", "sien", "son", "sont", "sous", "soyez", "sujet", "sur", "ta",
    "tandis", "te", "tellement", "tels", "tes", "toi", "ton", "tous", "tout", "trop", "très",
    "tu", "un", "une", "valeur", "voie", "voient", "vont", "vos", "votre", "vous", "vu", "ça",
    "étaient", "état", "étions", "été", "être",
];

/// English stop words.
pub static ENGLISH_STOPWORDS: &[&str] = &[
    "a", "able", "about", "above", "according", "accordingly", "across", "actually", "after",
    "afterwards", "again", "against", "ain't", "all", "allow", "allows", "almost", "alone",
    "along", "already", "also", "although", "always", "am", "among", "amongst", "amoungst",
    "amount", "an", "and", "another", "any", "anybody", "anyhow", "anyone", "anything", "anyway",
    "anyways", "anywhere", "apart", "appear", "appreciate", "appropriate", "are", "aren't",
    "around", "as", "aside", "ask", "asking", "associated", "at", "available", "away", "awfully",
    "back", "be", "became", "because", "become", "becomes", "becoming", "been", "before",
    "beforehand", "behind", "being", "believe", "below", "beside", "besides", "best", "better",
    "between", "beyond", "bill", "both", "bottom", "brief", "but", "by", "call", "came", "can",
    "cannot", "cant", "can't", "cause", "causes", "certain", "certainly", "changes", "clearly",
    "co", "com", "come", "comes", "computer", "con", "concerning", "consequently", "consider",
    "considering", "contain", "containing", "contains", "corresponding", "could", "couldnt",
    "couldn't", "course", "cry", "currently", "c'mon", "c's", "de", "definitely", "describe",
    "described", "despite", "detail", "did", "didn't", "different", "do", "does", "doesn't",
    "doing", "done", "don't", "down", "downwards", "due", "during", "each", "edu", "eg", "eight",
    "either", "eleven", "else", "elsewhere", "empty", "enough", "entirely", "especially", "et",
    "etc", "even", "ever", "every", "everybody", "everyone", "everything", "everywhere", "ex",
    "exactly", "example", "except", "far", "few", "fifteen", "fifth", "fify", "fill", "find",
    "fire", "first", "five", "followed", "following", "follows", "for", "former", "formerly",
    "forth", "forty", "found", "four", "from", "front", "full", "further", "furthermore", "get",
    "gets", "getting", "give", "given", "gives", "go", "goes", "going", "gone", "got", "gotten",
    "greetings", "had", "hadn't", "happens", "hardly", "has", "hasnt", "hasn't", "have",
    "haven't", "having", "he", "hello", "help", "hence", "her", "here", "hereafter", "hereby",
    "herein", "hereupon", "here's", "hers", "herself", "he's", "hi", "him", "himself", "his",
    "hither", "hopefully", "how", "howbeit", "however", "hundred", "i", "i'd", "i'll", "i'm",
    "i've", "ie", "if", "ignored", "immediate", "in", "inasmuch", "inc", "indeed", "indicate",
    "indicated", "indicates", "inner", "insofar", "instead", "interest", "into", "inward", "is",
    "isn't", "it", "its", "itself", "it'd", "it'll", "it's'", "i'd", "i'll", "i'm", "i've",
    "just", "keep", "keeps", "kept", "know", "known", "knows", "last", "lately", "later",
    "latter", "latterly", "least", "less", "lest", "let", "let's", "like", "liked", "likely",
    "little", "look", "looking", "looks", "ltd", "made", "mainly", "many", "may", "maybe", "me",
    "mean", "meanwhile", "merely", "might", "mill", "mine", "more", "moreover", "most", "mostly",
    "move", "much", "must", "my", "myself", "name", "namely", "nd", "near", "nearly",
    "necessary", "need", "needs", "neither", "never", "nevertheless", "new", "next", "nine",
    "no", "nobody", "non", "none", "noone", "nor", "normally", "not", "nothing", "novel", "now",
    "nowhere", "obviously", "of", "off", "often", "oh", "ok", "okay", "old", "on", "once", "one",
    "ones", "only", "onto", "or", "other", "others", "otherwise", "ought", "our", "ours",
    "ourselves", "out", "outside", "over", "overall", "own", "part", "particular",
    "particularly", "per", "perhaps", "placed", "please", "plus", "possible", "presumably",
    "probably", "provides", "put", "que", "quite", "qv", "rather", "rd", "re", "really",
    "reasonably", "regarding", "regardless", "regards", "relatively", "respectively", "right",
    "said", "same", "saw", "say", "saying", "says", "second", "secondly", "see", "seeing",
    "seem", "seemed", "seeming", "seems", "seen", "self", "selves", "sensible", "sent",
    "serious", "seriously", "seven", "several", "shall", "she", "should", "shouldn't", "show",
    "side", "since", "sincere", "six", "sixty", "so", "some", "somebody", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhat", "somewhere", "soon", "sorry", "specified",
    "specify", "specifying", "still", "sub", "such", "sup", "sure", "system", "take", "taken",
    "tell", "ten", "tends", "th", "than", "thank", "thanks", "thanx", "that", "that's", "thats",
    "that's", "the", "their", "theirs", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "theres", "thereupon", "there's", "these",
    "they", "they'd", "they'll", "they're", "they've", "thick", "thin", "think", "third", "this",
    "thorough", "thoroughly", "those", "though", "three", "through", "throughout", "thru",
    "thus", "to", "together", "too", "took", "top", "toward", "towards", "tried", "tries",
    "truly", "try", "trying", "twelve", "twenty", "twice", "two", "t's", "un", "under",
    "unfortunately", "unless", "unlikely", "until", "unto", "up", "upon", "us", "use", "used",
    "useful", "uses", "using", "usually", "value", "various", "very", "via", "viz", "vs", "want",
    "wants", "was", "wasn't", "way", "we", "welcome", "well", "went", "were", "weren't", "we'd",
    "we'll", "we're", "we've", "what", "whatever", "what's", "when", "whence", "whenever",
    "where", "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "where's",
    "whether", "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "who's",
    "why", "will", "willing", "wish", "with", "within", "without", "wonder", "won't", "would",
    "wouldn't", "yes", "yet", "you", "your", "yours", "yourself", "yourselves", "you'd",
    "you'll", "you're", "you've", "zero",
];

/// Stop-word set for a language tag; unknown tags fall back to English.
pub fn stopwords_for(lang: &str) -> HashSet<&'static str> {
    let words = match lang {
        "fr" | "french" => FRENCH_STOPWORDS,
        _ => ENGLISH_STOPWORDS,
    };
    words.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        let fr = stopwords_for("fr");
        assert!(fr.contains("le") && fr.contains("vous") && fr.contains("quelle"));
        let en = stopwords_for("en");
        assert!(en.contains("the") && en.contains("me") && en.contains("hello"));
        assert!(!en.contains("speaking"));
    }
}
