/*
Run with:
    an ONNX export of RobBERT's masked-language head as robbert.onnx
    and its tokenizer.json next to it, then
    cargo run --example mark_all
*/

use diedat_rs::{DieDat, Interpretation, Segment};

fn main() -> anyhow::Result<()> {
    let model_path = "robbert.onnx";
    let tokenizer_path = "tokenizer.json";

    let diedat = DieDat::new(model_path, tokenizer_path)?;

    let text = "Ik denk dat die man die daar loopt het huis dat leeg staat koopt.";
    let segments = diedat.mark_all(text)?;

    let mut output = String::new();
    for segment in &segments {
        match segment {
            Segment::Part { part } => output.push_str(part),
            Segment::Prediction(p) if p.interpretation == Interpretation::Incorrect => {
                output.push_str(&format!("[{} -> {}]", p.input, p.predicted.as_str()));
            }
            Segment::Prediction(p) => output.push_str(&p.input),
        }
    }

    println!("Input: {}", text);
    println!("Output: {}", output);

    Ok(())
}
