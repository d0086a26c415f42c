use serde_json::json;

#[cfg(test)]
mod tests {
  use super::*;

  mod encoding {
    use super::*;
    use nbcodec::to_multiline;

    #[test]
    fn single_line_stays_a_plain_string() {
      assert_eq!(to_multiline("1 + 1"), json!("1 + 1"));
      assert_eq!(to_multiline(""), json!(""));
    }

    #[test]
    fn lines_keep_their_trailing_newline_except_the_last() {
      assert_eq!(to_multiline("a\nb"), json!(["a\n", "b"]));
      assert_eq!(
        to_multiline("import os\nimport sys\nprint(42)"),
        json!(["import os\n", "import sys\n", "print(42)"])
      );
    }

    #[test]
    fn trailing_newline_produces_a_final_empty_element() {
      assert_eq!(to_multiline("a\nb\n"), json!(["a\n", "b\n", ""]));
      assert_eq!(to_multiline("\n"), json!(["\n", ""]));
    }

    #[test]
    fn blank_interior_lines_survive() {
      assert_eq!(to_multiline("a\n\nb"), json!(["a\n", "\n", "b"]));
    }
  }

  mod decoding {
    use super::*;
    use nbcodec::{from_multiline, NbcodecError};

    #[test]
    fn string_passes_through() {
      assert_eq!(from_multiline(&json!("x = 3")).unwrap(), "x = 3");
    }

    #[test]
    fn array_concatenates_without_separator() {
      let value = json!(["a\n", "b\n", ""]);
      assert_eq!(from_multiline(&value).unwrap(), "a\nb\n");
      assert_eq!(from_multiline(&json!([])).unwrap(), "");
    }

    #[test]
    fn other_json_types_are_malformed() {
      for value in [json!(42), json!(null), json!({"a": 1}), json!(true)] {
        assert!(matches!(
          from_multiline(&value),
          Err(NbcodecError::MalformedSource)
        ));
      }
    }

    #[test]
    fn non_string_array_elements_are_malformed() {
      assert!(matches!(
        from_multiline(&json!(["a\n", 2])),
        Err(NbcodecError::MalformedSource)
      ));
    }
  }

  mod round_trip {
    use super::*;
    use nbcodec::{from_multiline, to_multiline};

    #[test]
    fn multiline_text_survives() {
      for text in [
        "a\nb",
        "a\nb\n",
        "\n",
        "\n\n\n",
        "def f():\n    return 1\n",
        "line with trailing space \nnext",
      ] {
        assert_eq!(from_multiline(&to_multiline(text)).unwrap(), text);
      }
    }

    #[test]
    fn single_line_text_survives() {
      for text in ["", "x", "no newline here"] {
        let encoded = to_multiline(text);
        assert!(encoded.is_string());
        assert_eq!(from_multiline(&encoded).unwrap(), text);
      }
    }
  }

  mod cell_source {
    use super::*;
    use nbcodec::{set_source, source, NbcodecError};

    #[test]
    fn reads_both_encodings() {
      let cell = json!({"source": "1+1"});
      assert_eq!(source(&cell).unwrap(), "1+1");

      let cell = json!({"source": ["1+1\n", "2+2"]});
      assert_eq!(source(&cell).unwrap(), "1+1\n2+2");
    }

    #[test]
    fn absent_source_reads_as_empty() {
      assert_eq!(source(&json!({})).unwrap(), "");
    }

    #[test]
    fn mistyped_source_is_an_error_not_an_empty_string() {
      let cell = json!({"source": 42});
      assert!(matches!(
        source(&cell),
        Err(NbcodecError::MalformedSource)
      ));
    }

    #[test]
    fn set_source_replaces_only_the_source_field() {
      let mut cell = json!({
        "cell_type": "code",
        "execution_count": 1,
        "metadata": {"collapsed": false},
        "outputs": [],
        "source": "old",
      });
      set_source(&mut cell, "a\nb");

      assert_eq!(cell["source"], json!(["a\n", "b"]));
      assert_eq!(cell["cell_type"], "code");
      assert_eq!(cell["execution_count"], 1);
      assert_eq!(cell["metadata"], json!({"collapsed": false}));

      // Field order is part of the wire format diffing story
      let keys: Vec<&String> = cell.as_object().unwrap().keys().collect();
      assert_eq!(
        keys,
        ["cell_type", "execution_count", "metadata", "outputs", "source"]
      );
    }

    #[test]
    fn set_then_get_round_trips() {
      let mut cell = json!({"source": ""});
      for text in ["x = 1", "x = 1\ny = 2\n", "\n"] {
        set_source(&mut cell, text);
        assert_eq!(source(&cell).unwrap(), text);
      }
    }
  }
}
